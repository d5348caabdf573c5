use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateVisitRequest, UpdateVisitRequest, Visit};

pub struct VisitService {
    supabase: SupabaseClient,
}

impl VisitService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_visit(
        &self,
        dentist_id: &str,
        patient_id: Uuid,
        request: CreateVisitRequest,
        auth_token: &str,
    ) -> Result<Visit> {
        debug!("Creating visit for patient {}", patient_id);

        let now = Utc::now();
        let body = json!({
            "dentist_id": dentist_id,
            "patient_id": patient_id,
            "appointment_id": request.appointment_id,
            "visit_date": request.visit_date.unwrap_or(now),
            "chief_complaint": request.chief_complaint,
            "symptoms": request.symptoms,
            "treatments_performed": request.treatments_performed.unwrap_or_default(),
            "notes": request.notes,
            "diagnosis": request.diagnosis,
            "prescriptions": request.prescriptions.unwrap_or_default(),
            "next_appointment_suggestion": request.next_appointment_suggestion,
            "attachments": request.attachments.unwrap_or_default(),
            "created_at": now,
            "updated_at": now,
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/visits", auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to create visit"))?;

        Ok(serde_json::from_value(row)?)
    }

    /// Visits of one patient, latest first.
    pub async fn get_patient_visits(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Visit>> {
        let path = format!("/rest/v1/visits?patient_id=eq.{}", patient_id);
        self.fetch_sorted(&path, auth_token).await
    }

    /// Every visit recorded by a dentist across all patients, latest first.
    pub async fn get_dentist_visits(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Visit>> {
        let path = format!("/rest/v1/visits?dentist_id=eq.{}", dentist_id);
        self.fetch_sorted(&path, auth_token).await
    }

    /// The visit written up for a given appointment, if one exists. There
    /// should never be more than one per appointment.
    pub async fn get_visit_by_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Visit>> {
        let path = format!("/rest/v1/visits?appointment_id=eq.{}", appointment_id);
        let visits = self.fetch_sorted(&path, auth_token).await?;
        Ok(visits.into_iter().next())
    }

    pub async fn get_visit(&self, visit_id: Uuid, auth_token: &str) -> Result<Option<Visit>> {
        let path = format!("/rest/v1/visits?id=eq.{}", visit_id);
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

    pub async fn update_visit(
        &self,
        visit_id: Uuid,
        request: UpdateVisitRequest,
        auth_token: &str,
    ) -> Result<Visit> {
        debug!("Updating visit {}", visit_id);

        let mut update_data = serde_json::Map::new();

        if let Some(visit_date) = request.visit_date {
            update_data.insert("visit_date".to_string(), json!(visit_date));
        }
        if let Some(chief_complaint) = request.chief_complaint {
            update_data.insert("chief_complaint".to_string(), json!(chief_complaint));
        }
        if let Some(symptoms) = request.symptoms {
            update_data.insert("symptoms".to_string(), json!(symptoms));
        }
        if let Some(treatments_performed) = request.treatments_performed {
            update_data.insert("treatments_performed".to_string(), json!(treatments_performed));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(diagnosis) = request.diagnosis {
            update_data.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(prescriptions) = request.prescriptions {
            update_data.insert("prescriptions".to_string(), json!(prescriptions));
        }
        if let Some(suggestion) = request.next_appointment_suggestion {
            update_data.insert("next_appointment_suggestion".to_string(), json!(suggestion));
        }
        if let Some(attachments) = request.attachments {
            update_data.insert("attachments".to_string(), json!(attachments));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        let path = format!("/rest/v1/visits?id=eq.{}", visit_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, Value::Object(update_data))
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Visit not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_visit(&self, visit_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting visit {}", visit_id);

        let path = format!("/rest/v1/visits?id=eq.{}", visit_id);
        self.supabase.delete(&path, Some(auth_token)).await
    }

    async fn fetch_sorted(&self, path: &str, auth_token: &str) -> Result<Vec<Visit>> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await?;

        let mut visits: Vec<Visit> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        Ok(visits)
    }
}
