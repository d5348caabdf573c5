use anyhow::{Result, anyhow};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::aggregation::{monthly_balance, transactions_in_month};
use crate::models::{CreateTransactionRequest, MonthlyBalance, Transaction, UpdateTransactionRequest};

pub struct TransactionService {
    supabase: SupabaseClient,
}

impl TransactionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_transaction(
        &self,
        dentist_id: &str,
        request: CreateTransactionRequest,
        auth_token: &str,
    ) -> Result<Transaction> {
        debug!("Creating {} transaction for dentist {}", request.transaction_type, dentist_id);

        if request.amount < 0.0 {
            return Err(anyhow!("Amount cannot be negative"));
        }

        let now = Utc::now();
        let body = json!({
            "dentist_id": dentist_id,
            "type": request.transaction_type,
            "amount": request.amount,
            "category": request.category,
            "concept": request.concept,
            "date": request.date,
            "payment_method": request.payment_method,
            "status": request.status,
            "is_possible": request.is_possible,
            "patient_id": request.patient_id,
            "appointment_id": request.appointment_id,
            "notes": request.notes,
            "created_at": now,
            "updated_at": now,
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/transactions", auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to create transaction"))?;

        Ok(serde_json::from_value(row)?)
    }

    /// Full tenant ledger, newest first.
    pub async fn get_transactions(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Transaction>> {
        debug!("Fetching transactions for dentist {}", dentist_id);

        let path = format!("/rest/v1/transactions?dentist_id=eq.{}", dentist_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut transactions: Vec<Transaction> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    pub async fn get_transactions_by_month(
        &self,
        dentist_id: &str,
        year: i32,
        month: u32,
        auth_token: &str,
    ) -> Result<Vec<Transaction>> {
        let all = self.get_transactions(dentist_id, auth_token).await?;
        Ok(transactions_in_month(&all, year, month).into_iter().cloned().collect())
    }

    pub async fn get_transaction(
        &self,
        transaction_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Transaction>> {
        let path = format!("/rest/v1/transactions?id=eq.{}", transaction_id);
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

    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        request: UpdateTransactionRequest,
        auth_token: &str,
    ) -> Result<Transaction> {
        debug!("Updating transaction {}", transaction_id);

        let mut update_data = serde_json::Map::new();

        if let Some(tx_type) = request.transaction_type {
            update_data.insert("type".to_string(), json!(tx_type));
        }
        if let Some(amount) = request.amount {
            if amount < 0.0 {
                return Err(anyhow!("Amount cannot be negative"));
            }
            update_data.insert("amount".to_string(), json!(amount));
        }
        if let Some(category) = request.category {
            update_data.insert("category".to_string(), json!(category));
        }
        if let Some(concept) = request.concept {
            update_data.insert("concept".to_string(), json!(concept));
        }
        if let Some(date) = request.date {
            update_data.insert("date".to_string(), json!(date));
        }
        if let Some(payment_method) = request.payment_method {
            update_data.insert("payment_method".to_string(), json!(payment_method));
        }
        if let Some(status) = request.status {
            update_data.insert("status".to_string(), json!(status));
        }
        if let Some(is_possible) = request.is_possible {
            update_data.insert("is_possible".to_string(), json!(is_possible));
        }
        if let Some(patient_id) = request.patient_id {
            update_data.insert("patient_id".to_string(), json!(patient_id));
        }
        if let Some(appointment_id) = request.appointment_id {
            update_data.insert("appointment_id".to_string(), json!(appointment_id));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        let path = format!("/rest/v1/transactions?id=eq.{}", transaction_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, Value::Object(update_data))
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Transaction not found"))?;

        Ok(serde_json::from_value(row)?)
    }

    pub async fn delete_transaction(&self, transaction_id: Uuid, auth_token: &str) -> Result<()> {
        debug!("Deleting transaction {}", transaction_id);

        let path = format!("/rest/v1/transactions?id=eq.{}", transaction_id);
        self.supabase.delete(&path, Some(auth_token)).await
    }

    /// Monthly roll-up computed over the full fetched ledger.
    pub async fn get_monthly_balance(
        &self,
        dentist_id: &str,
        year: i32,
        month: u32,
        auth_token: &str,
    ) -> Result<MonthlyBalance> {
        let all = self.get_transactions(dentist_id, auth_token).await?;
        Ok(monthly_balance(&all, year, month))
    }
}
