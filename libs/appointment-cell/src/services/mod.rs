pub mod appointments;

pub use appointments::AppointmentService;
