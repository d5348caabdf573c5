use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateTransactionRequest, UpdateTransactionRequest};
use crate::services::TransactionService;

#[axum::debug_handler]
pub async fn create_transaction(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Json<Value>, AppError> {
    if request.amount < 0.0 {
        return Err(AppError::ValidationError("Amount cannot be negative".to_string()));
    }

    let service = TransactionService::new(&config);
    let transaction = service.create_transaction(&user.id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(transaction)))
}

#[axum::debug_handler]
pub async fn list_transactions(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = TransactionService::new(&config);
    let transactions = service.get_transactions(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "transactions": transactions,
        "total": transactions.len()
    })))
}

#[axum::debug_handler]
pub async fn list_transactions_by_month(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Value>, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::ValidationError("Month must be between 1 and 12".to_string()));
    }

    let service = TransactionService::new(&config);
    let transactions = service.get_transactions_by_month(&user.id, year, month, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "transactions": transactions,
        "total": transactions.len()
    })))
}

#[axum::debug_handler]
pub async fn get_transaction(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TransactionService::new(&config);
    let transaction = service.get_transaction(transaction_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    Ok(Json(json!(transaction)))
}

#[axum::debug_handler]
pub async fn update_transaction(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Value>, AppError> {
    if matches!(request.amount, Some(a) if a < 0.0) {
        return Err(AppError::ValidationError("Amount cannot be negative".to_string()));
    }

    let service = TransactionService::new(&config);
    let transaction = service.update_transaction(transaction_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(transaction)))
}

#[axum::debug_handler]
pub async fn delete_transaction(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TransactionService::new(&config);
    service.delete_transaction(transaction_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn get_monthly_balance(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Value>, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::ValidationError("Month must be between 1 and 12".to_string()));
    }

    let service = TransactionService::new(&config);
    let balance = service.get_monthly_balance(&user.id, year, month, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(balance)))
}
