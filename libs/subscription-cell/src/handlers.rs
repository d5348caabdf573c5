use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::gate::is_currently_entitled;
use crate::models::{ActivateSubscriptionRequest, ExtendSubscriptionRequest, SubscriptionStatusResponse};
use crate::services::SubscriptionService;

fn require_admin(config: &AppConfig, user: &User) -> Result<(), AppError> {
    let email = user.email.as_deref().unwrap_or_default();
    if !config.is_admin(email) {
        return Err(AppError::Auth("Admin access required".to_string()));
    }
    Ok(())
}

/// Current entitlement for the signed-in dentist, recomputed from the stored
/// end dates.
#[axum::debug_handler]
pub async fn get_subscription_status(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<SubscriptionStatusResponse>, AppError> {
    let service = SubscriptionService::new(&config);

    let profile = service.get_profile(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Dentist profile not found".to_string()))?;

    let entitled = is_currently_entitled(&profile, Utc::now());

    Ok(Json(SubscriptionStatusResponse {
        subscription_status: profile.subscription_status,
        entitled,
        trial_ends_at: profile.trial_ends_at,
        subscription_ends_at: profile.subscription_ends_at,
        plan_type: profile.plan_type,
    }))
}

#[axum::debug_handler]
pub async fn list_dentists(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&config, &user)?;

    let service = SubscriptionService::new(&config);
    let dentists = service.list_dentists(auth.token())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "dentists": dentists,
        "total": dentists.len()
    })))
}

#[axum::debug_handler]
pub async fn activate_subscription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(dentist_id): Path<String>,
    Json(request): Json<ActivateSubscriptionRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&config, &user)?;

    let service = SubscriptionService::new(&config);
    let profile = service.activate(&dentist_id, request.plan_type, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn extend_subscription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(dentist_id): Path<String>,
    Json(request): Json<ExtendSubscriptionRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&config, &user)?;

    if request.months <= 0 {
        return Err(AppError::ValidationError("Extension must be at least one month".to_string()));
    }

    let service = SubscriptionService::new(&config);
    let profile = service.extend(&dentist_id, request.months, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn cancel_subscription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(dentist_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&config, &user)?;

    let service = SubscriptionService::new(&config);
    let profile = service.cancel(&dentist_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(profile)))
}
