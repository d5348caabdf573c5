use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;
use tower::ServiceExt;
use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{method, path};

use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use subscription_cell::middleware::subscription_gate;

fn guarded_app(config: Arc<shared_config::AppConfig>) -> Router {
    Router::new()
        .route("/patients", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(config, subscription_gate))
}

fn dentist_row(id: &str, status: &str, trial_ends_at: Option<String>,
               subscription_ends_at: Option<String>) -> serde_json::Value {
    json!({
        "id": id,
        "email": "doc@example.com",
        "display_name": "Dr. Test",
        "license_number": "MP-0001",
        "specialization": null,
        "phone": null,
        "clinic_name": null,
        "clinic_address": null,
        "subscription_status": status,
        "trial_ends_at": trial_ends_at,
        "subscription_ends_at": subscription_ends_at,
        "plan_type": null,
        "last_payment_date": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
}

async fn run_gate(profile_rows: serde_json::Value) -> StatusCode {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_mock_server(&mock_server.uri()));

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_rows))
        .mount(&mock_server)
        .await;

    let request = Request::builder()
        .uri("/patients")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = guarded_app(config).oneshot(request).await.unwrap();
    response.status()
}

#[tokio::test]
async fn gate_allows_live_trial() {
    let trial_end = (Utc::now() + Duration::days(3)).to_rfc3339();
    let rows = json!([dentist_row("d1", "trial", Some(trial_end), None)]);

    assert_eq!(run_gate(rows).await, StatusCode::OK);
}

#[tokio::test]
async fn gate_denies_expired_trial() {
    let trial_end = (Utc::now() - Duration::seconds(1)).to_rfc3339();
    let rows = json!([dentist_row("d1", "trial", Some(trial_end), None)]);

    assert_eq!(run_gate(rows).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gate_denies_stale_active_status_past_end_date() {
    let sub_end = (Utc::now() - Duration::days(2)).to_rfc3339();
    let rows = json!([dentist_row("d1", "active", None, Some(sub_end))]);

    assert_eq!(run_gate(rows).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gate_allows_active_with_future_end_date() {
    let sub_end = (Utc::now() + Duration::days(10)).to_rfc3339();
    let rows = json!([dentist_row("d1", "active", None, Some(sub_end))]);

    assert_eq!(run_gate(rows).await, StatusCode::OK);
}

#[tokio::test]
async fn gate_denies_cancelled_account() {
    let rows = json!([dentist_row("d1", "cancelled", None, None)]);

    assert_eq!(run_gate(rows).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gate_blocks_missing_profile_silently() {
    assert_eq!(run_gate(json!([])).await, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gate_rejects_missing_token() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_mock_server(&mock_server.uri()));

    let request = Request::builder()
        .uri("/patients")
        .body(Body::empty())
        .unwrap();

    let response = guarded_app(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
