use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub dentist_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub date_of_birth: DateTime<Utc>,
    pub address: Option<String>,
    pub medical_notes: Option<String>,
    /// Group membership for institutional patients billed monthly.
    pub group_name: Option<String>,
    pub monthly_price: Option<f64>,
    pub last_monthly_payment: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive substring match over first name, last name and
    /// email; phone is matched as typed.
    pub fn matches(&self, term: &str) -> bool {
        let term_lower = term.to_lowercase();
        self.first_name.to_lowercase().contains(&term_lower)
            || self.last_name.to_lowercase().contains(&term_lower)
            || self.phone.contains(term)
            || self.email.as_ref()
                .is_some_and(|e| e.to_lowercase().contains(&term_lower))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub date_of_birth: DateTime<Utc>,
    pub address: Option<String>,
    pub medical_notes: Option<String>,
    pub group_name: Option<String>,
    pub monthly_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub medical_notes: Option<String>,
    pub group_name: Option<String>,
    pub monthly_price: Option<f64>,
    pub last_monthly_payment: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ToothStatus {
    Healthy,
    Caries,
    Filling,
    Crown,
    Missing,
    Implant,
    RootCanal,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToothRecord {
    pub status: ToothStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    No,
    Occasional,
    Frequent,
    Heavy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Prognosis {
    Excellent,
    Good,
    Fair,
    Poor,
    Hopeless,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeriodontalIndices {
    pub plaque: Option<f64>,
    pub gingival: Option<f64>,
    pub bleeding: Option<f64>,
}

/// One installment paid against the treatment budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetPayment {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub treatment: String,
    pub amount: f64,
}

/// Clinical record of a patient. At most one per patient; writes go
/// through an upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: String,
    pub chief_complaint: Option<String>,
    pub current_illness: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub current_medications: Option<Vec<String>>,
    pub systemic_diseases: Option<Vec<String>>,
    pub previous_surgeries: Option<String>,
    pub family_history: Option<String>,
    pub smoking_habit: Option<HabitFrequency>,
    pub alcohol_consumption: Option<HabitFrequency>,
    pub bruxism: Option<bool>,
    pub other_habits: Option<String>,
    pub extraoral_exam: Option<String>,
    pub intraoral_exam: Option<String>,
    /// Keyed by tooth number (FDI notation as string).
    pub odontogram: Option<HashMap<String, ToothRecord>>,
    pub periodontal_indices: Option<PeriodontalIndices>,
    pub presumptive_diagnosis: Option<String>,
    pub definitive_diagnosis: Option<String>,
    pub treatment_plan: Option<String>,
    pub prognosis: Option<Prognosis>,
    pub budget_amount: Option<f64>,
    pub budget_payments: Option<Vec<BudgetPayment>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MedicalHistory {
    /// Sum of installments received so far.
    pub fn budget_paid(&self) -> f64 {
        self.budget_payments
            .as_deref()
            .map(|payments| payments.iter().map(|p| p.amount).sum())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveMedicalHistoryRequest {
    pub chief_complaint: Option<String>,
    pub current_illness: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub current_medications: Option<Vec<String>>,
    pub systemic_diseases: Option<Vec<String>>,
    pub previous_surgeries: Option<String>,
    pub family_history: Option<String>,
    pub smoking_habit: Option<HabitFrequency>,
    pub alcohol_consumption: Option<HabitFrequency>,
    pub bruxism: Option<bool>,
    pub other_habits: Option<String>,
    pub extraoral_exam: Option<String>,
    pub intraoral_exam: Option<String>,
    pub odontogram: Option<HashMap<String, ToothRecord>>,
    pub periodontal_indices: Option<PeriodontalIndices>,
    pub presumptive_diagnosis: Option<String>,
    pub definitive_diagnosis: Option<String>,
    pub treatment_plan: Option<String>,
    pub prognosis: Option<Prognosis>,
    pub budget_amount: Option<f64>,
    pub budget_payments: Option<Vec<BudgetPayment>>,
}

/// Evolution note from a single patient encounter, optionally linked to
/// the appointment it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub dentist_id: String,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub visit_date: DateTime<Utc>,
    pub chief_complaint: Option<String>,
    pub symptoms: Option<String>,
    pub treatments_performed: Option<Vec<String>>,
    pub notes: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<Vec<String>>,
    pub next_appointment_suggestion: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateVisitRequest {
    pub appointment_id: Option<Uuid>,
    pub visit_date: Option<DateTime<Utc>>,
    pub chief_complaint: Option<String>,
    pub symptoms: Option<String>,
    pub treatments_performed: Option<Vec<String>>,
    pub notes: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<Vec<String>>,
    pub next_appointment_suggestion: Option<String>,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVisitRequest {
    pub visit_date: Option<DateTime<Utc>>,
    pub chief_complaint: Option<String>,
    pub symptoms: Option<String>,
    pub treatments_performed: Option<Vec<String>>,
    pub notes: Option<String>,
    pub diagnosis: Option<String>,
    pub prescriptions: Option<Vec<String>>,
    pub next_appointment_suggestion: Option<String>,
    pub attachments: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(first: &str, last: &str, phone: &str, email: Option<&str>) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            dentist_id: "dentist-1".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.map(str::to_string),
            phone: phone.to_string(),
            date_of_birth: Utc::now(),
            address: None,
            medical_notes: None,
            group_name: None,
            monthly_price: None,
            last_monthly_payment: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn search_matches_names_case_insensitively() {
        let p = patient("Ana", "García", "600123123", None);
        assert!(p.matches("ana"));
        assert!(p.matches("GARC"));
        assert!(!p.matches("bob"));
    }

    #[test]
    fn search_matches_phone_and_email() {
        let p = patient("Ana", "García", "600123123", Some("Ana@Example.com"));
        assert!(p.matches("600123"));
        assert!(p.matches("ana@example"));
    }

    #[test]
    fn budget_paid_sums_installments() {
        let history = MedicalHistory {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            dentist_id: "dentist-1".to_string(),
            chief_complaint: None,
            current_illness: None,
            allergies: None,
            current_medications: None,
            systemic_diseases: None,
            previous_surgeries: None,
            family_history: None,
            smoking_habit: None,
            alcohol_consumption: None,
            bruxism: None,
            other_habits: None,
            extraoral_exam: None,
            intraoral_exam: None,
            odontogram: None,
            periodontal_indices: None,
            presumptive_diagnosis: None,
            definitive_diagnosis: None,
            treatment_plan: None,
            prognosis: None,
            budget_amount: Some(500.0),
            budget_payments: Some(vec![
                BudgetPayment {
                    id: Uuid::new_v4(),
                    date: Utc::now(),
                    treatment: "Cleaning".to_string(),
                    amount: 100.0,
                },
                BudgetPayment {
                    id: Uuid::new_v4(),
                    date: Utc::now(),
                    treatment: "Filling".to_string(),
                    amount: 150.0,
                },
            ]),
            created_at: None,
            updated_at: None,
        };

        assert_eq!(history.budget_paid(), 250.0);
    }

    #[test]
    fn tooth_status_uses_kebab_case() {
        let json = serde_json::to_string(&ToothStatus::RootCanal).unwrap();
        assert_eq!(json, "\"root-canal\"");
    }
}
