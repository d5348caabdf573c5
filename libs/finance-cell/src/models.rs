use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Paid,
    Pending,
    Partial,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

/// A single income or expense entry in the practice ledger.
///
/// `is_possible` marks speculative income tracked for forecasting: it counts
/// toward gross income but never toward the net figures, whatever its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub dentist_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub concept: String,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    #[serde(default)]
    pub is_possible: bool,
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub concept: String,
    pub date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    #[serde(default)]
    pub is_possible: bool,
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub concept: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub status: Option<TransactionStatus>,
    pub is_possible: Option<bool>,
    pub patient_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Monthly roll-up of the ledger. `balance` nets only confirmed cash
/// movements; speculative income shows up in `gross_income` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBalance {
    pub gross_income: f64,
    pub net_income: f64,
    pub possible_income: f64,
    pub expenses: f64,
    pub balance: f64,
}
