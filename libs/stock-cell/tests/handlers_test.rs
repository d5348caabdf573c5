use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use uuid::Uuid;
use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{body_partial_json, method, path, query_param};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};
use stock_cell::handlers::*;
use stock_cell::models::{AdjustQuantityRequest, CreateStockItemRequest, RecordMaterialUseRequest, StockCategory};

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn test_user_extension(user: &TestUser) -> Extension<User> {
    Extension(user.to_user())
}

fn material_row(material_id: Uuid, appointment_id: Uuid, stock_item_id: Uuid,
                quantity_used: i64) -> serde_json::Value {
    json!({
        "id": material_id,
        "appointment_id": appointment_id,
        "stock_item_id": stock_item_id,
        "stock_item_name": "Composite resin",
        "category": "material",
        "quantity_used": quantity_used,
        "unit": "units",
        "cost": 12.5,
        "registered_at": "2025-04-10T10:00:00Z"
    })
}

#[tokio::test]
async fn create_stock_item_returns_row() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));
    let item_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 20, 5)
        ])))
        .mount(&mock_server)
        .await;

    let request = CreateStockItemRequest {
        name: "Composite resin".to_string(),
        category: StockCategory::Material,
        quantity: 20,
        unit: "units".to_string(),
        min_quantity: 5,
        location: None,
        supplier: None,
        cost: Some(12.5),
        notes: None,
        expiration_date: None,
    };

    let result = create_stock_item(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Json(request),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response["quantity"], 20);
    assert_eq!(response["name"], "Composite resin");
}

#[tokio::test]
async fn create_stock_item_rejects_negative_quantity() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    let request = CreateStockItemRequest {
        name: "Gauze".to_string(),
        category: StockCategory::Consumable,
        quantity: -1,
        unit: "units".to_string(),
        min_quantity: 0,
        location: None,
        supplier: None,
        cost: None,
        notes: None,
        expiration_date: None,
    };

    let result = create_stock_item(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Json(request),
    ).await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn low_stock_list_only_contains_items_at_or_below_minimum() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));

    let low_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .and(query_param("dentist_id", format!("eq.{}", dentist.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(low_id, &dentist.id, 5, 5),
            MockSupabaseResponses::stock_item_row(Uuid::new_v4(), &dentist.id, 6, 5),
        ])))
        .mount(&mock_server)
        .await;

    let result = list_low_stock_items(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response["total"], 1);
    assert_eq!(response["items"][0]["id"], json!(low_id));
}

#[tokio::test]
async fn insufficient_decrement_fails_before_any_write() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));
    let item_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 3, 5)
        ])))
        .mount(&mock_server)
        .await;

    // The row must stay untouched, so no PATCH may be issued.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = adjust_stock_quantity(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Path(item_id),
        Json(AdjustQuantityRequest { change: -5 }),
    ).await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
}

#[tokio::test]
async fn adjust_quantity_patches_new_total() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));
    let item_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 10, 5)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/stock"))
        .and(body_partial_json(json!({ "quantity": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 7, 5)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = adjust_stock_quantity(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Path(item_id),
        Json(AdjustQuantityRequest { change: -3 }),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response["quantity"], 7);
}

#[tokio::test]
async fn recording_material_use_snapshots_then_decrements() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));
    let item_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let material_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 10, 5)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointment_materials"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            material_row(material_id, appointment_id, item_id, 4)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/stock"))
        .and(body_partial_json(json!({ "quantity": 6 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 6, 5)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = record_material_use(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Path(appointment_id),
        Json(RecordMaterialUseRequest { stock_item_id: item_id, quantity_used: 4 }),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response["quantity_used"], 4);
    assert_eq!(response["stock_item_id"], json!(item_id));
}

#[tokio::test]
async fn insufficient_material_use_writes_nothing() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));
    let item_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 2, 5)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointment_materials"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = record_material_use(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Path(Uuid::new_v4()),
        Json(RecordMaterialUseRequest { stock_item_id: item_id, quantity_used: 10 }),
    ).await;

    assert!(matches!(result, Err(AppError::InsufficientStock(_))));
}

#[tokio::test]
async fn removing_material_restores_consumed_quantity() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_server(&mock_server.uri());

    let dentist = TestUser::dentist("doc@example.com");
    let token = JwtTestUtils::create_test_token(&dentist, &config.supabase_jwt_secret, Some(24));
    let item_id = Uuid::new_v4();
    let material_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointment_materials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            material_row(material_id, Uuid::new_v4(), item_id, 4)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointment_materials"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/stock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 6, 5)
        ])))
        .mount(&mock_server)
        .await;

    // Exactly the consumed quantity goes back: 6 + 4 = 10.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/stock"))
        .and(body_partial_json(json!({ "quantity": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::stock_item_row(item_id, &dentist.id, 10, 5)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = remove_material(
        State(Arc::new(config)),
        auth_header(&token),
        test_user_extension(&dentist),
        Path(material_id),
    ).await;

    let response = result.unwrap().0;
    assert_eq!(response["deleted"], true);
}
