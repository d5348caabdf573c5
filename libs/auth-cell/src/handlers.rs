use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt;
use shared_utils::validation::{
    validate_email, validate_license_number, validate_name, validate_password,
};

use crate::models::{AuthResponse, RegisterRequest, ResetPasswordRequest, SignInRequest};
use crate::services::AuthService;

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_email(&request.email).map_err(AppError::ValidationError)?;
    validate_password(&request.password).map_err(AppError::ValidationError)?;
    validate_name(&request.display_name, "Display name").map_err(AppError::ValidationError)?;
    validate_license_number(&request.license_number).map_err(AppError::ValidationError)?;

    let service = AuthService::new(&config);
    let (session, profile) = service.register(request)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(AuthResponse { session, profile }))
}

#[axum::debug_handler]
pub async fn sign_in(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<Value>, AppError> {
    validate_email(&request.email).map_err(AppError::ValidationError)?;

    let service = AuthService::new(&config);
    let (session, profile) = service.sign_in(request)
        .await
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(Json(json!({
        "session": session,
        "profile": profile,
    })))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    validate_email(&request.email).map_err(AppError::ValidationError)?;

    let service = AuthService::new(&config);
    service.reset_password(&request.email)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "sent": true })))
}

#[axum::debug_handler]
pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let user = jwt::validate_token(auth.token(), &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Like `validate_token`, but reports invalid tokens as a 200 with
/// `valid: false` so clients can poll it without error handling.
#[axum::debug_handler]
pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Json<Value> {
    let valid = jwt::validate_token(auth.token(), &config.supabase_jwt_secret).is_ok();
    Json(json!({ "valid": valid }))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    debug!("Getting profile for user {}", user.id);

    let service = AuthService::new(&config);
    let profile = service.get_dentist_profile(&user.id, auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Dentist profile not found".to_string()))?;

    Ok(Json(json!(profile)))
}
