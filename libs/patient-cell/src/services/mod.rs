pub mod medical_history;
pub mod patients;
pub mod visits;

pub use medical_history::MedicalHistoryService;
pub use patients::PatientService;
pub use visits::VisitService;
