use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::validation::{
    validate_date_of_birth, validate_email, validate_name, validate_phone,
};

use crate::models::{
    CreatePatientRequest, CreateVisitRequest, SaveMedicalHistoryRequest, SearchQuery,
    UpdatePatientRequest, UpdateVisitRequest,
};
use crate::services::{MedicalHistoryService, PatientService, VisitService};

fn validate_patient_fields(
    first_name: &str,
    last_name: &str,
    phone: &str,
    email: Option<&str>,
) -> Result<(), AppError> {
    validate_name(first_name, "First name").map_err(AppError::ValidationError)?;
    validate_name(last_name, "Last name").map_err(AppError::ValidationError)?;
    validate_phone(phone).map_err(AppError::ValidationError)?;
    if let Some(email) = email {
        validate_email(email).map_err(AppError::ValidationError)?;
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    validate_patient_fields(
        &request.first_name,
        &request.last_name,
        &request.phone,
        request.email.as_deref(),
    )?;
    validate_date_of_birth(request.date_of_birth, Utc::now())
        .map_err(AppError::ValidationError)?;

    let service = PatientService::new(&config);
    let patient = service.create_patient(&user.id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);
    let patients = service.get_patients(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn search_patients(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(AppError::ValidationError("Search term cannot be empty".to_string()));
    }

    let service = PatientService::new(&config);
    let patients = service.search_patients(&user.id, term, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);
    let patient = service.get_patient(patient_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Patient not found".to_string()))?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    if let Some(first_name) = request.first_name.as_deref() {
        validate_name(first_name, "First name").map_err(AppError::ValidationError)?;
    }
    if let Some(last_name) = request.last_name.as_deref() {
        validate_name(last_name, "Last name").map_err(AppError::ValidationError)?;
    }
    if let Some(phone) = request.phone.as_deref() {
        validate_phone(phone).map_err(AppError::ValidationError)?;
    }
    if let Some(email) = request.email.as_deref() {
        validate_email(email).map_err(AppError::ValidationError)?;
    }
    if let Some(date_of_birth) = request.date_of_birth {
        validate_date_of_birth(date_of_birth, Utc::now()).map_err(AppError::ValidationError)?;
    }

    let service = PatientService::new(&config);
    let patient = service.update_patient(patient_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);
    service.delete_patient(patient_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn get_medical_history(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalHistoryService::new(&config);
    let history = service.get_medical_history(patient_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Medical history not found".to_string()))?;

    Ok(Json(json!(history)))
}

#[axum::debug_handler]
pub async fn save_medical_history(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<SaveMedicalHistoryRequest>,
) -> Result<Json<Value>, AppError> {
    if matches!(request.budget_amount, Some(amount) if amount < 0.0) {
        return Err(AppError::ValidationError("Budget amount cannot be negative".to_string()));
    }

    let service = MedicalHistoryService::new(&config);
    let history = service.save_medical_history(&user.id, patient_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(history)))
}

#[axum::debug_handler]
pub async fn delete_medical_history(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(history_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalHistoryService::new(&config);
    service.delete_medical_history(history_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn create_visit(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<CreateVisitRequest>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    let visit = service.create_visit(&user.id, patient_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(visit)))
}

#[axum::debug_handler]
pub async fn list_patient_visits(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    let visits = service.get_patient_visits(patient_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "visits": visits,
        "total": visits.len()
    })))
}

#[axum::debug_handler]
pub async fn list_visits(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    let visits = service.get_dentist_visits(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "visits": visits,
        "total": visits.len()
    })))
}

#[axum::debug_handler]
pub async fn get_visit_by_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    let visit = service.get_visit_by_appointment(appointment_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("No visit recorded for this appointment".to_string()))?;

    Ok(Json(json!(visit)))
}

#[axum::debug_handler]
pub async fn get_visit(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(visit_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    let visit = service.get_visit(visit_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Visit not found".to_string()))?;

    Ok(Json(json!(visit)))
}

#[axum::debug_handler]
pub async fn update_visit(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(visit_id): Path<Uuid>,
    Json(request): Json<UpdateVisitRequest>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    let visit = service.update_visit(visit_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(visit)))
}

#[axum::debug_handler]
pub async fn delete_visit(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(visit_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(&config);
    service.delete_visit(visit_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "deleted": true })))
}
