use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use appointment_cell::router::create_appointment_router;
use auth_cell::router::create_auth_router;
use backup_cell::router::create_backup_router;
use finance_cell::router::create_finance_router;
use patient_cell::router::create_patient_router;
use shared_config::AppConfig;
use stock_cell::router::create_stock_router;
use subscription_cell::middleware::subscription_gate;
use subscription_cell::router::subscription_routes;

/// Auth and subscription management stay outside the entitlement gate so a
/// dentist with a lapsed subscription can still sign in, see their status
/// and have an admin reactivate them. Everything clinical sits behind it.
pub fn create_router(state: Arc<AppConfig>) -> Router {
    let gated = Router::new()
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/appointments", create_appointment_router(state.clone()))
        .nest("/finances", create_finance_router(state.clone()))
        .nest("/stock", create_stock_router(state.clone()))
        .nest("/backup", create_backup_router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), subscription_gate));

    Router::new()
        .route("/", get(|| async { "Dentos API is running!" }))
        .nest("/auth", create_auth_router(state.clone()))
        .nest("/subscription", subscription_routes(state))
        .merge(gated)
}
