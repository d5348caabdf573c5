use std::sync::Arc;
use axum::{middleware, routing::{delete, get, post, put}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_stock_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_stock_item))
        .route("/", get(list_stock_items))
        .route("/low", get(list_low_stock_items))
        .route("/{id}", get(get_stock_item))
        .route("/{id}", put(update_stock_item))
        .route("/{id}", delete(delete_stock_item))
        .route("/{id}/quantity", post(adjust_stock_quantity))
        .route("/appointments/{id}/materials", post(record_material_use))
        .route("/appointments/{id}/materials", get(list_appointment_materials))
        .route("/materials/{id}", delete(remove_material))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
