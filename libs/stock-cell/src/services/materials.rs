use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentMaterial, RecordMaterialUseRequest, StockError};
use crate::services::stock::StockService;

/// Links inventory to appointments: each recorded use snapshots the item and
/// decrements stock, each removal deletes the snapshot and restores stock.
///
/// The snapshot insert and the quantity update are two independent writes
/// with no transaction around them; a crash in between leaves them
/// inconsistent. Known gap, inherited from the data store's REST surface.
pub struct MaterialService {
    supabase: SupabaseClient,
    stock: StockService,
}

impl MaterialService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            stock: StockService::new(config),
        }
    }

    pub async fn record_material_use(
        &self,
        appointment_id: Uuid,
        request: RecordMaterialUseRequest,
        auth_token: &str,
    ) -> Result<AppointmentMaterial, StockError> {
        if request.quantity_used <= 0 {
            return Err(StockError::InvalidQuantity);
        }

        let item = self.stock.get_stock_item(request.stock_item_id, auth_token)
            .await?
            .ok_or(StockError::NotFound)?;

        // Check before any write so an insufficient request changes nothing.
        if item.quantity < request.quantity_used {
            return Err(StockError::InsufficientStock {
                available: item.quantity,
                requested: request.quantity_used,
                unit: item.unit,
            });
        }

        debug!("Recording use of {} x{} for appointment {}",
               item.name, request.quantity_used, appointment_id);

        let body = json!({
            "appointment_id": appointment_id,
            "stock_item_id": item.id,
            "stock_item_name": item.name,
            "category": item.category,
            "quantity_used": request.quantity_used,
            "unit": item.unit,
            "cost": item.cost,
            "registered_at": Utc::now(),
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/appointment_materials", auth_token, body)
            .await
            .map_err(StockError::Gateway)?;

        let row = result.into_iter().next()
            .ok_or_else(|| StockError::Gateway(anyhow!("Failed to record material use")))?;
        let material: AppointmentMaterial =
            serde_json::from_value(row).map_err(|e| StockError::Gateway(e.into()))?;

        if let Err(e) = self.stock
            .adjust_quantity(item.id, -request.quantity_used, auth_token)
            .await
        {
            // Snapshot exists but stock was not decremented.
            warn!("Stock decrement failed after material snapshot {}: {}", material.id, e);
            return Err(e);
        }

        Ok(material)
    }

    /// Materials recorded against an appointment, newest first.
    pub async fn get_appointment_materials(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<AppointmentMaterial>> {
        let path = format!("/rest/v1/appointment_materials?appointment_id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut materials: Vec<AppointmentMaterial> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        materials.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(materials)
    }

    /// Total cost of materials consumed in an appointment, using the cost
    /// snapshots. Entries without a cost contribute nothing.
    pub async fn get_appointment_materials_cost(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<f64> {
        let materials = self.get_appointment_materials(appointment_id, auth_token).await?;
        Ok(materials_cost(&materials))
    }

    pub async fn remove_material(
        &self,
        material_id: Uuid,
        auth_token: &str,
    ) -> Result<(), StockError> {
        let path = format!("/rest/v1/appointment_materials?id=eq.{}", material_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(StockError::Gateway)?;

        let row = result.into_iter().next().ok_or(StockError::MaterialNotFound)?;
        let material: AppointmentMaterial =
            serde_json::from_value(row).map_err(|e| StockError::Gateway(e.into()))?;

        debug!("Removing material record {} and restoring {} x{}",
               material.id, material.stock_item_name, material.quantity_used);

        self.supabase.delete(&path, Some(auth_token))
            .await
            .map_err(StockError::Gateway)?;

        // Give the consumed quantity back to stock.
        if let Err(e) = self.stock
            .adjust_quantity(material.stock_item_id, material.quantity_used, auth_token)
            .await
        {
            warn!("Stock restore failed after removing material {}: {}", material.id, e);
            return Err(e);
        }

        Ok(())
    }
}

pub fn materials_cost(materials: &[AppointmentMaterial]) -> f64 {
    materials.iter()
        .filter_map(|m| m.cost.map(|c| c * m.quantity_used as f64))
        .sum()
}
