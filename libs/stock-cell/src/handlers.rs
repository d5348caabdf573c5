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

use crate::models::{
    AdjustQuantityRequest, CreateStockItemRequest, RecordMaterialUseRequest, UpdateStockItemRequest,
};
use crate::services::{MaterialService, StockService};

#[axum::debug_handler]
pub async fn create_stock_item(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateStockItemRequest>,
) -> Result<Json<Value>, AppError> {
    if request.quantity < 0 || request.min_quantity < 0 {
        return Err(AppError::ValidationError("Quantities cannot be negative".to_string()));
    }

    let service = StockService::new(&config);
    let item = service.create_stock_item(&user.id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn list_stock_items(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = StockService::new(&config);
    let items = service.get_stock_items(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "items": items,
        "total": items.len()
    })))
}

#[axum::debug_handler]
pub async fn list_low_stock_items(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = StockService::new(&config);
    let items = service.get_low_stock_items(&user.id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "items": items,
        "total": items.len()
    })))
}

#[axum::debug_handler]
pub async fn get_stock_item(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(stock_item_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = StockService::new(&config);
    let item = service.get_stock_item(stock_item_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Stock item not found".to_string()))?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn update_stock_item(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(stock_item_id): Path<Uuid>,
    Json(request): Json<UpdateStockItemRequest>,
) -> Result<Json<Value>, AppError> {
    if matches!(request.quantity, Some(q) if q < 0)
        || matches!(request.min_quantity, Some(q) if q < 0)
    {
        return Err(AppError::ValidationError("Quantities cannot be negative".to_string()));
    }

    let service = StockService::new(&config);
    let item = service.update_stock_item(stock_item_id, request, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn delete_stock_item(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(stock_item_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = StockService::new(&config);
    service.delete_stock_item(stock_item_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn adjust_stock_quantity(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(stock_item_id): Path<Uuid>,
    Json(request): Json<AdjustQuantityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = StockService::new(&config);
    let item = service.adjust_quantity(stock_item_id, request.change, auth.token()).await?;

    Ok(Json(json!(item)))
}

#[axum::debug_handler]
pub async fn record_material_use(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RecordMaterialUseRequest>,
) -> Result<Json<Value>, AppError> {
    let service = MaterialService::new(&config);
    let material = service.record_material_use(appointment_id, request, auth.token()).await?;

    Ok(Json(json!(material)))
}

#[axum::debug_handler]
pub async fn list_appointment_materials(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MaterialService::new(&config);
    let materials = service.get_appointment_materials(appointment_id, auth.token())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let total_cost = crate::services::materials::materials_cost(&materials);

    Ok(Json(json!({
        "materials": materials,
        "total": materials.len(),
        "total_cost": total_cost
    })))
}

#[axum::debug_handler]
pub async fn remove_material(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(material_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = MaterialService::new(&config);
    service.remove_material(material_id, auth.token()).await?;

    Ok(Json(json!({ "deleted": true })))
}
