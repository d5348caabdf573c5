use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

/// Subscription routes sit outside the gate so an expired dentist can still
/// see their status and an admin can still manage accounts.
pub fn subscription_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/status", get(get_subscription_status))
        .route("/admin/dentists", get(list_dentists))
        .route("/admin/dentists/{id}/activate", post(activate_subscription))
        .route("/admin/dentists/{id}/extend", post(extend_subscription))
        .route("/admin/dentists/{id}/cancel", post(cancel_subscription))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
