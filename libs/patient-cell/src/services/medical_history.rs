use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{MedicalHistory, SaveMedicalHistoryRequest};

/// Clinical records. Each patient has at most one; `save` decides between
/// insert and update by looking the record up first.
pub struct MedicalHistoryService {
    supabase: SupabaseClient,
}

impl MedicalHistoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_medical_history(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<MedicalHistory>> {
        let path = format!("/rest/v1/medical_histories?patient_id=eq.{}&limit=1", patient_id);
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

    pub async fn save_medical_history(
        &self,
        dentist_id: &str,
        patient_id: Uuid,
        request: SaveMedicalHistoryRequest,
        auth_token: &str,
    ) -> Result<MedicalHistory> {
        let existing = self.get_medical_history(patient_id, auth_token).await?;

        let mut fields = history_fields(&request)?;
        fields.insert("updated_at".to_string(), json!(Utc::now()));

        let result = match existing {
            Some(history) => {
                debug!("Updating medical history {} for patient {}", history.id, patient_id);

                let path = format!("/rest/v1/medical_histories?id=eq.{}", history.id);
                self.supabase
                    .write_returning(Method::PATCH, &path, auth_token, Value::Object(fields))
                    .await?
            }
            None => {
                debug!("Creating medical history for patient {}", patient_id);

                fields.insert("dentist_id".to_string(), json!(dentist_id));
                fields.insert("patient_id".to_string(), json!(patient_id));
                fields.insert("created_at".to_string(), json!(Utc::now()));
                self.supabase
                    .write_returning(Method::POST, "/rest/v1/medical_histories", auth_token, Value::Object(fields))
                    .await?
            }
        };

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to save medical history"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_medical_history(&self, history_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting medical history {}", history_id);

        let path = format!("/rest/v1/medical_histories?id=eq.{}", history_id);
        self.supabase.delete(&path, Some(auth_token)).await
    }
}

fn history_fields(request: &SaveMedicalHistoryRequest) -> Result<serde_json::Map<String, Value>> {
    // Serialize the request wholesale and drop the unset fields so a
    // partial save never nulls out what the caller didn't send.
    let serialized = serde_json::to_value(request)?;
    let Value::Object(map) = serialized else {
        return Err(anyhow!("Medical history payload must be an object"));
    };

    Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prognosis;

    #[test]
    fn unset_fields_are_not_sent() {
        let request = SaveMedicalHistoryRequest {
            chief_complaint: Some("Toothache".to_string()),
            prognosis: Some(Prognosis::Good),
            ..Default::default()
        };

        let fields = history_fields(&request).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["chief_complaint"], "Toothache");
        assert_eq!(fields["prognosis"], "good");
    }
}
