use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentStatus, CreateAppointmentRequest, UpdateAppointmentRequest,
};

pub struct AppointmentService {
    supabase: SupabaseClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_appointment(
        &self,
        dentist_id: &str,
        request: CreateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment> {
        debug!("Creating appointment for patient {} at {}", request.patient_id, request.date);

        let now = Utc::now();
        let body = json!({
            "dentist_id": dentist_id,
            "patient_id": request.patient_id,
            "date": request.date,
            "duration": request.duration,
            "type": request.appointment_type,
            "status": AppointmentStatus::Scheduled,
            "notes": request.notes,
            "price": request.price,
            "payment_status": request.payment_status,
            "transaction_id": null,
            "created_at": now,
            "updated_at": now,
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/appointments", auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to create appointment"))?;

        Ok(serde_json::from_value(row)?)
    }

    /// Full agenda of a dentist in chronological order.
    pub async fn get_appointments(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let path = format!("/rest/v1/appointments?dentist_id=eq.{}", dentist_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut appointments: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        appointments.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(appointments)
    }

    pub async fn get_appointments_by_month(
        &self,
        dentist_id: &str,
        year: i32,
        month: u32,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let all = self.get_appointments(dentist_id, auth_token).await?;
        Ok(all.into_iter().filter(|a| a.is_in_month(year, month)).collect())
    }

    pub async fn get_appointments_by_day(
        &self,
        dentist_id: &str,
        day: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let all = self.get_appointments(dentist_id, auth_token).await?;
        Ok(all.into_iter().filter(|a| a.is_on_day(day)).collect())
    }

    /// History of one patient, most recent appointment first.
    pub async fn get_patient_appointments(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>> {
        let path = format!("/rest/v1/appointments?patient_id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut appointments: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        appointments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(appointments)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Appointment>> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment> {
        debug!("Updating appointment {}", appointment_id);

        let mut update_data = serde_json::Map::new();

        if let Some(date) = request.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(duration) = request.duration {
            update_data.insert("duration".to_string(), json!(duration));
        }
        if let Some(appointment_type) = request.appointment_type {
            update_data.insert("type".to_string(), json!(appointment_type));
        }
        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(price) = request.price {
            update_data.insert("price".to_string(), json!(price));
        }
        if let Some(payment_status) = request.payment_status {
            update_data.insert("payment_status".to_string(), json!(payment_status));
        }
        if let Some(transaction_id) = request.transaction_id {
            update_data.insert("transaction_id".to_string(), json!(transaction_id));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, Value::Object(update_data))
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Appointment not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment> {
        debug!("Setting appointment {} status", appointment_id);

        let body = json!({
            "status": status,
            "updated_at": Utc::now(),
        });

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Appointment not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        self.supabase.delete(&path, Some(auth_token)).await
    }
}
