use std::sync::Arc;
use axum::{middleware, routing::{delete, get, post, put}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn create_finance_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions", get(list_transactions))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}", put(update_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
        .route("/transactions/month/{year}/{month}", get(list_transactions_by_month))
        .route("/balance/{year}/{month}", get(get_monthly_balance))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
