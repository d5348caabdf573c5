use anyhow::Result;
use chrono::Utc;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BackupData, BackupMetadata, DentistInfo, BACKUP_FORMAT_VERSION};

pub struct ExportService {
    supabase: SupabaseClient,
}

impl ExportService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Pulls every table belonging to the dentist and bundles it into one
    /// self-describing document. Rows go out as raw JSON so the export
    /// survives schema additions without a code change here.
    pub async fn export_all_data(&self, dentist_id: &str, auth_token: &str) -> Result<BackupData> {
        debug!("Exporting all data for dentist {}", dentist_id);

        let (profile_rows, patients, medical_histories, appointments, transactions, stock, visits) =
            tokio::try_join!(
                self.fetch_table("dentists", "id", dentist_id, auth_token),
                self.fetch_table("patients", "dentist_id", dentist_id, auth_token),
                self.fetch_table("medical_histories", "dentist_id", dentist_id, auth_token),
                self.fetch_table("appointments", "dentist_id", dentist_id, auth_token),
                self.fetch_table("transactions", "dentist_id", dentist_id, auth_token),
                self.fetch_table("stock", "dentist_id", dentist_id, auth_token),
                self.fetch_table("visits", "dentist_id", dentist_id, auth_token),
            )?;

        let profile = profile_rows.into_iter().next().unwrap_or(Value::Null);
        let total_records = patients.len()
            + medical_histories.len()
            + appointments.len()
            + transactions.len()
            + stock.len()
            + visits.len();

        info!("Export for dentist {} contains {} records", dentist_id, total_records);

        Ok(BackupData {
            export_date: Utc::now().to_rfc3339(),
            dentist_info: DentistInfo {
                uid: dentist_id.to_string(),
                email: string_field(&profile, "email").unwrap_or_default(),
                display_name: string_field(&profile, "display_name"),
                clinic_name: string_field(&profile, "clinic_name"),
                clinic_address: string_field(&profile, "clinic_address"),
                phone: string_field(&profile, "phone"),
                license_number: string_field(&profile, "license_number"),
            },
            patients,
            medical_histories,
            appointments,
            transactions,
            stock,
            visits,
            metadata: BackupMetadata {
                version: BACKUP_FORMAT_VERSION.to_string(),
                total_records,
            },
        })
    }

    async fn fetch_table(
        &self,
        table: &str,
        key: &str,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Value>> {
        let path = format!("/rest/v1/{}?{}=eq.{}", table, key, dentist_id);
        self.supabase.request(Method::GET, &path, Some(auth_token), None).await
    }
}

fn string_field(row: &Value, field: &str) -> Option<String> {
    row.get(field)?.as_str().map(str::to_string)
}

/// File name the export is served under, date-stamped for easy sorting.
pub fn backup_filename(now: chrono::DateTime<Utc>) -> String {
    format!("backup-dentos-{}.json", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_is_date_stamped() {
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 15, 30, 0).unwrap();
        assert_eq!(backup_filename(now), "backup-dentos-2025-04-10.json");
    }

    #[test]
    fn string_field_ignores_non_strings() {
        let row = serde_json::json!({ "email": "doc@example.com", "age": 40 });
        assert_eq!(string_field(&row, "email").as_deref(), Some("doc@example.com"));
        assert_eq!(string_field(&row, "age"), None);
        assert_eq!(string_field(&row, "missing"), None);
    }
}
