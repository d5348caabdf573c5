use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, HeaderValue},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::BackupData;
use crate::services::export::{backup_filename, ExportService};

/// Streams the full tenant export as a downloadable JSON attachment.
#[axum::debug_handler]
pub async fn export_backup(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<(HeaderMap, Json<BackupData>), AppError> {
    let service = ExportService::new(&config);
    let backup = service.export_all_data(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut response_headers = HeaderMap::new();
    let disposition = format!("attachment; filename=\"{}\"", backup_filename(Utc::now()));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response_headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((response_headers, Json(backup)))
}
