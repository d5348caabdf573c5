use std::sync::Arc;
use axum::{middleware, routing::{delete, get, post, put}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_appointment_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_appointment))
        .route("/", get(list_appointments))
        .route("/month/{year}/{month}", get(list_appointments_by_month))
        .route("/day/{date}", get(list_appointments_by_day))
        .route("/patient/{id}", get(list_patient_appointments))
        .route("/{id}", get(get_appointment))
        .route("/{id}", put(update_appointment))
        .route("/{id}", delete(delete_appointment))
        .route("/{id}/status", put(update_appointment_status))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
