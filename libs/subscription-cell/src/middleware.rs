use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_token;
use shared_utils::jwt::validate_token;

use crate::gate::{access_decision, AccessDecision};
use crate::services::SubscriptionService;

/// Gate middleware for protected routes. Runs on every request the way the
/// web client re-checked on every page load: authenticate, fetch the profile,
/// recompute entitlement from the stored end dates.
///
/// Auth, registration and the expiry-notice surface are mounted outside this
/// layer, which is what prevents redirect loops.
pub async fn subscription_gate(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;

    let user = validate_token(&token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    let service = SubscriptionService::new(&config);
    let profile = service.get_profile(&user.id, &token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    match access_decision(profile.as_ref(), Utc::now()) {
        AccessDecision::Allow => Ok(next.run(request).await),
        AccessDecision::Denied(reason) => {
            debug!("Access denied for dentist {}: {:?}", user.id, reason);
            Err(AppError::SubscriptionExpired(reason.to_string()))
        }
        AccessDecision::Block => {
            // No profile for an authenticated identity: blocked without an
            // error body, matching the client's render-nothing behaviour.
            debug!("No dentist profile for authenticated user {}", user.id);
            Ok(StatusCode::FORBIDDEN.into_response())
        }
    }
}
