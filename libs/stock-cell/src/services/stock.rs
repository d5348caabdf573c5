use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateStockItemRequest, StockError, StockItem, UpdateStockItemRequest};

pub struct StockService {
    supabase: SupabaseClient,
}

impl StockService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_stock_item(
        &self,
        dentist_id: &str,
        request: CreateStockItemRequest,
        auth_token: &str,
    ) -> Result<StockItem> {
        debug!("Creating stock item '{}' for dentist {}", request.name, dentist_id);

        let now = Utc::now();
        let body = json!({
            "dentist_id": dentist_id,
            "name": request.name,
            "category": request.category,
            "quantity": request.quantity,
            "unit": request.unit,
            "min_quantity": request.min_quantity,
            "location": request.location,
            "supplier": request.supplier,
            "cost": request.cost,
            "notes": request.notes,
            "expiration_date": request.expiration_date,
            "created_at": now,
            "updated_at": now,
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/stock", auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to create stock item"))?;

        Ok(serde_json::from_value(row)?)
    }

    /// Full tenant inventory, sorted by name.
    pub async fn get_stock_items(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<StockItem>> {
        debug!("Fetching stock for dentist {}", dentist_id);

        let path = format!("/rest/v1/stock?dentist_id=eq.{}", dentist_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut items: Vec<StockItem> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(items)
    }

    pub async fn get_low_stock_items(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<StockItem>> {
        let all = self.get_stock_items(dentist_id, auth_token).await?;
        Ok(all.into_iter().filter(|item| item.is_low()).collect())
    }

    pub async fn get_stock_item(
        &self,
        stock_item_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<StockItem>> {
        let path = format!("/rest/v1/stock?id=eq.{}", stock_item_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_stock_item(
        &self,
        stock_item_id: Uuid,
        request: UpdateStockItemRequest,
        auth_token: &str,
    ) -> Result<StockItem> {
        debug!("Updating stock item {}", stock_item_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(category) = request.category {
            update_data.insert("category".to_string(), json!(category));
        }
        if let Some(quantity) = request.quantity {
            update_data.insert("quantity".to_string(), json!(quantity));
        }
        if let Some(unit) = request.unit {
            update_data.insert("unit".to_string(), json!(unit));
        }
        if let Some(min_quantity) = request.min_quantity {
            update_data.insert("min_quantity".to_string(), json!(min_quantity));
        }
        if let Some(location) = request.location {
            update_data.insert("location".to_string(), json!(location));
        }
        if let Some(supplier) = request.supplier {
            update_data.insert("supplier".to_string(), json!(supplier));
        }
        if let Some(cost) = request.cost {
            update_data.insert("cost".to_string(), json!(cost));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(expiration_date) = request.expiration_date {
            update_data.insert("expiration_date".to_string(), json!(expiration_date));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        let path = format!("/rest/v1/stock?id=eq.{}", stock_item_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, Value::Object(update_data))
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Stock item not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_stock_item(&self, stock_item_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting stock item {}", stock_item_id);

        let path = format!("/rest/v1/stock?id=eq.{}", stock_item_id);
        self.supabase.delete(&path, Some(auth_token)).await
    }

    /// Read-modify-write quantity adjustment. Rejects any change that would
    /// push the quantity below zero before issuing the write, so a failed
    /// check leaves the row untouched.
    pub async fn adjust_quantity(
        &self,
        stock_item_id: Uuid,
        change: i64,
        auth_token: &str,
    ) -> Result<StockItem, StockError> {
        let item = self.get_stock_item(stock_item_id, auth_token)
            .await?
            .ok_or(StockError::NotFound)?;

        let new_quantity = item.quantity + change;
        if new_quantity < 0 {
            return Err(StockError::InsufficientStock {
                available: item.quantity,
                requested: -change,
                unit: item.unit,
            });
        }

        debug!("Adjusting stock item {} quantity {} -> {}", stock_item_id, item.quantity, new_quantity);

        let body = json!({
            "quantity": new_quantity,
            "updated_at": Utc::now(),
        });

        let path = format!("/rest/v1/stock?id=eq.{}", stock_item_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, body)
            .await
            .map_err(StockError::Gateway)?;

        let row = result.into_iter().next().ok_or(StockError::NotFound)?;
        serde_json::from_value(row).map_err(|e| StockError::Gateway(e.into()))
    }
}
