use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription state stored on the dentist profile. Expiry of `Trial` and
/// `Active` is never written back eagerly; it is derived at access-check time
/// from `trial_ends_at` / `subscription_ends_at`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Cancelled,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Trial => write!(f, "trial"),
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Monthly,
    Annual,
}

impl PlanType {
    /// Billing periods are flat 30-day months.
    pub fn duration_months(&self) -> i64 {
        match self {
            PlanType::Monthly => 1,
            PlanType::Annual => 12,
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanType::Monthly => write!(f, "monthly"),
            PlanType::Annual => write!(f, "annual"),
        }
    }
}

/// Tenant root record. Every domain entity is scoped to one of these via a
/// `dentist_id` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DentistProfile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub license_number: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub plan_type: Option<PlanType>,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
