use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

/// Signup, sign-in and recovery stay public; profile access requires a
/// valid token.
pub fn create_auth_router(config: Arc<AppConfig>) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/signin", post(sign_in))
        .route("/reset-password", post(reset_password))
        .route("/validate", get(validate_token))
        .route("/verify", get(verify_token));

    let protected = Router::new()
        .route("/profile", get(get_profile))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware));

    public.merge(protected).with_state(config)
}
