use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreatePatientRequest, Patient, UpdatePatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        dentist_id: &str,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient> {
        debug!("Creating patient {} {} for dentist {}",
               request.first_name, request.last_name, dentist_id);

        let now = Utc::now();
        let body = json!({
            "dentist_id": dentist_id,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone": request.phone,
            "date_of_birth": request.date_of_birth,
            "address": request.address,
            "medical_notes": request.medical_notes,
            "group_name": request.group_name,
            "monthly_price": request.monthly_price,
            "created_at": now,
            "updated_at": now,
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/patients", auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to create patient"))?;

        Ok(serde_json::from_value(row)?)
    }

    /// All patients of a dentist, sorted by last name.
    pub async fn get_patients(&self, dentist_id: &str, auth_token: &str) -> Result<Vec<Patient>> {
        let path = format!("/rest/v1/patients?dentist_id=eq.{}", dentist_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut patients: Vec<Patient> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        patients.sort_by(|a, b| {
            (a.last_name.to_lowercase(), a.first_name.to_lowercase())
                .cmp(&(b.last_name.to_lowercase(), b.first_name.to_lowercase()))
        });
        Ok(patients)
    }

    pub async fn get_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Option<Patient>> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
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

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient> {
        debug!("Updating patient {}", patient_id);

        let mut update_data = serde_json::Map::new();

        if let Some(first_name) = request.first_name {
            update_data.insert("first_name".to_string(), json!(first_name));
        }
        if let Some(last_name) = request.last_name {
            update_data.insert("last_name".to_string(), json!(last_name));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(date_of_birth) = request.date_of_birth {
            update_data.insert("date_of_birth".to_string(), json!(date_of_birth));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(medical_notes) = request.medical_notes {
            update_data.insert("medical_notes".to_string(), json!(medical_notes));
        }
        if let Some(group_name) = request.group_name {
            update_data.insert("group_name".to_string(), json!(group_name));
        }
        if let Some(monthly_price) = request.monthly_price {
            update_data.insert("monthly_price".to_string(), json!(monthly_price));
        }
        if let Some(last_monthly_payment) = request.last_monthly_payment {
            update_data.insert("last_monthly_payment".to_string(), json!(last_monthly_payment));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, Value::Object(update_data))
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Patient not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting patient {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        self.supabase.delete(&path, Some(auth_token)).await
    }

    /// Substring search over the dentist's patients; filtering happens
    /// here because the store only offers per-column pattern matching.
    pub async fn search_patients(
        &self,
        dentist_id: &str,
        term: &str,
        auth_token: &str,
    ) -> Result<Vec<Patient>> {
        let all = self.get_patients(dentist_id, auth_token).await?;
        Ok(all.into_iter().filter(|p| p.matches(term)).collect())
    }
}
