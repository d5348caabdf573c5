use std::sync::Arc;
use axum::{middleware, routing::{delete, get, post, put}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_patient_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_patient))
        .route("/", get(list_patients))
        .route("/search", get(search_patients))
        .route("/{id}", get(get_patient))
        .route("/{id}", put(update_patient))
        .route("/{id}", delete(delete_patient))
        .route("/{id}/medical-history", get(get_medical_history))
        .route("/{id}/medical-history", put(save_medical_history))
        .route("/medical-histories/{id}", delete(delete_medical_history))
        .route("/{id}/visits", post(create_visit))
        .route("/{id}/visits", get(list_patient_visits))
        .route("/visits", get(list_visits))
        .route("/visits/{id}", get(get_visit))
        .route("/visits/{id}", put(update_visit))
        .route("/visits/{id}", delete(delete_visit))
        .route("/visits/by-appointment/{id}", get(get_visit_by_appointment))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
