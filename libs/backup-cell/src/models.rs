use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full tenant export. Field names are camelCase because the file is the
/// interchange format the companion import tooling expects.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub export_date: String,
    pub dentist_info: DentistInfo,
    pub patients: Vec<Value>,
    pub medical_histories: Vec<Value>,
    pub appointments: Vec<Value>,
    pub transactions: Vec<Value>,
    pub stock: Vec<Value>,
    pub visits: Vec<Value>,
    pub metadata: BackupMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DentistInfo {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    pub version: String,
    pub total_records: usize,
}

pub const BACKUP_FORMAT_VERSION: &str = "1.0";
