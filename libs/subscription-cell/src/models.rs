use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::dentist::{PlanType, SubscriptionStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateSubscriptionRequest {
    pub plan_type: PlanType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendSubscriptionRequest {
    pub months: i64,
}

/// What `/subscription/status` reports back to the client shell so it can
/// decide whether to show the expiry notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionStatusResponse {
    pub subscription_status: SubscriptionStatus,
    pub entitled: bool,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub plan_type: Option<PlanType>,
}
