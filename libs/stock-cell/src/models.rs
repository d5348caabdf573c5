use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockCategory {
    Material,
    Instrument,
    Medication,
    Consumable,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub id: Uuid,
    pub dentist_id: String,
    pub name: String,
    pub category: StockCategory,
    pub quantity: i64,
    pub unit: String,
    pub min_quantity: i64,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockItem {
    /// Low stock is purely derived; nothing in the row stores the flag.
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// Snapshot of a stock item consumed during an appointment. Name, category
/// and cost are copied at time of use so later stock edits don't rewrite
/// history. Immutable once created, except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentMaterial {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub stock_item_id: Uuid,
    pub stock_item_name: String,
    pub category: StockCategory,
    pub quantity_used: i64,
    pub unit: String,
    pub cost: Option<f64>,
    pub registered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStockItemRequest {
    pub name: String,
    pub category: StockCategory,
    pub quantity: i64,
    pub unit: String,
    pub min_quantity: i64,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStockItemRequest {
    pub name: Option<String>,
    pub category: Option<StockCategory>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub min_quantity: Option<i64>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustQuantityRequest {
    /// Positive to restock, negative to consume.
    pub change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMaterialUseRequest {
    pub stock_item_id: Uuid,
    pub quantity_used: i64,
}

#[derive(Debug, Error)]
pub enum StockError {
    #[error("Stock item not found")]
    NotFound,

    #[error("Not enough stock: {available} {unit} available, {requested} requested")]
    InsufficientStock {
        available: i64,
        requested: i64,
        unit: String,
    },

    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    #[error("Material record not found")]
    MaterialNotFound,

    #[error(transparent)]
    Gateway(#[from] anyhow::Error),
}

impl From<StockError> for shared_models::error::AppError {
    fn from(err: StockError) -> Self {
        use shared_models::error::AppError;
        match err {
            StockError::NotFound => AppError::NotFound("Stock item not found".to_string()),
            StockError::MaterialNotFound => AppError::NotFound("Material record not found".to_string()),
            StockError::InvalidQuantity => AppError::ValidationError(err.to_string()),
            StockError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            StockError::Gateway(e) => AppError::Internal(e.to_string()),
        }
    }
}
