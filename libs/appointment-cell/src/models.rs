use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentType {
    Consultation,
    Cleaning,
    Treatment,
    Emergency,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Partial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub dentist_id: String,
    pub patient_id: Uuid,
    pub date: DateTime<Utc>,
    /// Duration in minutes.
    pub duration: i64,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    /// Weak reference into the finance ledger; the transaction may have
    /// been deleted independently.
    pub transaction_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// 1-based month comparison against the appointment's UTC date.
    pub fn is_in_month(&self, year: i32, month: u32) -> bool {
        self.date.year() == year && self.date.month() == month
    }

    pub fn is_on_day(&self, day: DateTime<Utc>) -> bool {
        self.date.date_naive() == day.date_naive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub date: DateTime<Utc>,
    pub duration: i64,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub appointment_type: Option<AppointmentType>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    pub price: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    pub transaction_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn appointment(date: DateTime<Utc>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            dentist_id: "dentist-1".to_string(),
            patient_id: Uuid::new_v4(),
            date,
            duration: 30,
            appointment_type: AppointmentType::Consultation,
            status: AppointmentStatus::Scheduled,
            notes: None,
            price: None,
            payment_status: None,
            transaction_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn month_filter_uses_calendar_month() {
        let apt = appointment(Utc.with_ymd_and_hms(2025, 4, 30, 23, 0, 0).unwrap());
        assert!(apt.is_in_month(2025, 4));
        assert!(!apt.is_in_month(2025, 5));
        assert!(!apt.is_in_month(2024, 4));
    }

    #[test]
    fn day_filter_ignores_time_of_day() {
        let apt = appointment(Utc.with_ymd_and_hms(2025, 4, 10, 18, 30, 0).unwrap());
        assert!(apt.is_on_day(Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap()));
        assert!(!apt.is_on_day(Utc.with_ymd_and_hms(2025, 4, 11, 0, 0, 0).unwrap()));
    }
}
