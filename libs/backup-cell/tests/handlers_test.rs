use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::http::header;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use uuid::Uuid;
use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use backup_cell::handlers::export_backup;
use shared_models::auth::User;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn test_user_extension(user: &TestUser) -> Extension<User> {
    Extension(user.to_user())
}

async fn mount_tenant_tables(mock_server: &MockServer, dentist_id: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .and(query_param("id", format!("eq.{}", dentist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::dentist_profile_row(dentist_id, "active")
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_row(Uuid::new_v4(), dentist_id),
            MockSupabaseResponses::patient_row(Uuid::new_v4(), dentist_id),
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medical_histories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::transaction_row(
                Uuid::new_v4(), dentist_id, "income", 100.0, "paid", false,
                "2025-04-10T10:00:00Z",
            )
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(Uuid::new_v4(), dentist_id, 10, 5)
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/visits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn export_bundles_every_table_and_counts_records() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    mount_tenant_tables(&mock_server, &dentist.id).await;

    let result = export_backup(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
    ).await;

    let (_headers, body) = result.unwrap();
    let backup = body.0;

    assert_eq!(backup.patients.len(), 2);
    assert_eq!(backup.transactions.len(), 1);
    assert_eq!(backup.stock.len(), 1);
    // 2 patients + 1 transaction + 1 stock item, nothing else.
    assert_eq!(backup.metadata.total_records, 4);
    assert_eq!(backup.metadata.version, "1.0");
    assert_eq!(backup.dentist_info.uid, dentist.id);
    assert_eq!(backup.dentist_info.email, "dentist@example.com");
}

#[tokio::test]
async fn export_is_served_as_dated_attachment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    mount_tenant_tables(&mock_server, &dentist.id).await;

    let result = export_backup(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
    ).await;

    let (headers, _body) = result.unwrap();
    let disposition = headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"backup-dentos-"));
    assert!(disposition.ends_with(".json\""));
}

#[tokio::test]
async fn export_survives_missing_profile_row() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = export_backup(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
    ).await;

    let (_headers, body) = result.unwrap();
    let backup = body.0;
    assert_eq!(backup.metadata.total_records, 0);
    assert_eq!(backup.dentist_info.email, "");
}
