use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use axum_extra::TypedHeader;
use chrono::{DateTime, Duration, Utc};
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{body_partial_json, method, path};

use auth_cell::handlers::*;
use auth_cell::models::{RegisterRequest, SignInRequest};
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn session_response(user_id: &str) -> serde_json::Value {
    json!({
        "access_token": "session-token",
        "refresh_token": "refresh-token",
        "expires_in": 3600,
        "user": { "id": user_id, "email": "doc@example.com" }
    })
}

fn register_request() -> RegisterRequest {
    RegisterRequest {
        email: "doc@example.com".to_string(),
        password: "s3curePassw0rd".to_string(),
        display_name: "Dr. Example".to_string(),
        license_number: "MP-12345".to_string(),
        specialization: None,
        phone: None,
        clinic_name: Some("Example Dental".to_string()),
        clinic_address: None,
    }
}

#[tokio::test]
async fn registration_creates_profile_on_trial() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_response("dentist-1")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/dentists"))
        .and(body_partial_json(json!({ "subscription_status": "trial" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::dentist_profile_row("dentist-1", "trial")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = register(
        State(Arc::new(config)),
        Json(register_request()),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response.session.user_id, "dentist-1");
    assert_eq!(response.profile.id, "dentist-1");
}

#[tokio::test]
async fn registration_trial_runs_for_seven_days() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_response("dentist-1")))
        .mount(&mock_server)
        .await;

    let before = Utc::now();

    Mock::given(method("POST"))
        .and(path("/rest/v1/dentists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::dentist_profile_row("dentist-1", "trial")
        ])))
        .mount(&mock_server)
        .await;

    let result = register(
        State(Arc::new(config)),
        Json(register_request()),
    ).await;
    result.unwrap();

    // Inspect what was actually sent to the profile table.
    let requests = mock_server.received_requests().await.unwrap();
    let profile_insert = requests.iter()
        .find(|r| r.url.path() == "/rest/v1/dentists")
        .expect("profile insert request");
    let body: serde_json::Value = serde_json::from_slice(&profile_insert.body).unwrap();

    let trial_ends_at: DateTime<Utc> =
        serde_json::from_value(body["trial_ends_at"].clone()).unwrap();
    let expected = before + Duration::days(7);
    assert!((trial_ends_at - expected).num_minutes().abs() < 5);
}

#[tokio::test]
async fn registration_rejects_weak_password() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let mut request = register_request();
    request.password = "short".to_string();

    let result = register(
        State(Arc::new(config)),
        Json(request),
    ).await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn sign_in_returns_session_and_profile() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_response("dentist-1")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::dentist_profile_row("dentist-1", "active")
        ])))
        .mount(&mock_server)
        .await;

    let result = sign_in(
        State(Arc::new(config)),
        Json(SignInRequest {
            email: "doc@example.com".to_string(),
            password: "s3curePassw0rd".to_string(),
        }),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response["session"]["user_id"], "dentist-1");
    assert_eq!(response["profile"]["subscription_status"], "active");
}

#[tokio::test]
async fn sign_in_with_bad_credentials_is_auth_error() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            MockSupabaseResponses::error_response("Invalid login credentials", "invalid_grant")
        ))
        .mount(&mock_server)
        .await;

    let result = sign_in(
        State(Arc::new(config)),
        Json(SignInRequest {
            email: "doc@example.com".to_string(),
            password: "wrong".to_string(),
        }),
    ).await;

    assert!(matches!(result, Err(AppError::Auth(_))));
}

#[tokio::test]
async fn valid_token_passes_validation() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    let result = validate_token(
        State(Arc::new(config)),
        auth_header(&token),
    ).await;

    let response = result.unwrap().0;
    assert!(response.valid);
    assert_eq!(response.user_id, dentist.id);
}

#[tokio::test]
async fn expired_token_fails_validation_but_verify_answers_calmly() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let expired = JwtTestUtils::create_expired_token(&dentist, &config.supabase_jwt_secret);

    let config = Arc::new(config);
    let result = validate_token(
        State(config.clone()),
        auth_header(&expired),
    ).await;
    assert!(matches!(result, Err(AppError::Auth(_))));

    let verdict = verify_token(
        State(config),
        auth_header(&expired),
    ).await;
    assert_eq!(verdict.0["valid"], false);
}
