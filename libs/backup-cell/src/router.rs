use std::sync::Arc;
use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::export_backup;

pub fn create_backup_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/export", get(export_backup))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
