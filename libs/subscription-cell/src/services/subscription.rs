use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::dentist::{DentistProfile, PlanType};

/// Billing periods are flat 30-day months everywhere in the product.
const MONTH: Duration = Duration::days(30);

/// End date for a fresh activation.
pub fn activation_end(now: DateTime<Utc>, plan: PlanType) -> DateTime<Utc> {
    now + MONTH * plan.duration_months() as i32
}

/// End date for an extension. Extensions are additive: a future end date is
/// pushed out from where it is, never reset from "now". A missing or already
/// past end date starts the new period from now.
pub fn extended_end(
    current_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    months: i64,
) -> DateTime<Utc> {
    let extension = MONTH * months as i32;
    match current_end {
        Some(end) if end > now => end + extension,
        _ => now + extension,
    }
}

pub struct SubscriptionService {
    supabase: SupabaseClient,
}

impl SubscriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_profile(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Option<DentistProfile>> {
        debug!("Fetching dentist profile: {}", dentist_id);

        let path = format!("/rest/v1/dentists?id=eq.{}", dentist_id);
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

    pub async fn list_dentists(&self, auth_token: &str) -> Result<Vec<DentistProfile>> {
        debug!("Listing all dentist profiles");

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/dentists",
            Some(auth_token),
            None,
        ).await?;

        let dentists = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dentists)
    }

    /// Admin activation: trial (or lapsed) account becomes active for one
    /// plan period from now.
    pub async fn activate(
        &self,
        dentist_id: &str,
        plan: PlanType,
        auth_token: &str,
    ) -> Result<DentistProfile> {
        let now = Utc::now();
        let ends_at = activation_end(now, plan);

        info!("Activating subscription for dentist {} ({} plan, ends {})",
              dentist_id, plan, ends_at);

        let body = json!({
            "subscription_status": "active",
            "plan_type": plan,
            "subscription_ends_at": ends_at,
            "last_payment_date": now,
            "updated_at": now,
        });

        self.patch_dentist(dentist_id, body, auth_token).await
    }

    /// Admin extension: pushes the end date out by whole 30-day months and
    /// re-stamps the payment date.
    pub async fn extend(
        &self,
        dentist_id: &str,
        months: i64,
        auth_token: &str,
    ) -> Result<DentistProfile> {
        if months <= 0 {
            return Err(anyhow!("Extension must be at least one month"));
        }

        let profile = self.get_profile(dentist_id, auth_token)
            .await?
            .ok_or_else(|| anyhow!("Dentist not found"))?;

        let now = Utc::now();
        let new_end = extended_end(profile.subscription_ends_at, now, months);

        info!("Extending subscription for dentist {} by {} months (new end {})",
              dentist_id, months, new_end);

        let body = json!({
            "subscription_status": "active",
            "subscription_ends_at": new_end,
            "last_payment_date": now,
            "updated_at": now,
        });

        self.patch_dentist(dentist_id, body, auth_token).await
    }

    /// Admin cancellation: only the status flips; end dates are left as-is.
    pub async fn cancel(&self, dentist_id: &str, auth_token: &str) -> Result<DentistProfile> {
        info!("Cancelling subscription for dentist {}", dentist_id);

        let body = json!({
            "subscription_status": "cancelled",
            "updated_at": Utc::now(),
        });

        self.patch_dentist(dentist_id, body, auth_token).await
    }

    async fn patch_dentist(
        &self,
        dentist_id: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<DentistProfile> {
        let path = format!("/rest/v1/dentists?id=eq.{}", dentist_id);
        let result = self.supabase
            .write_returning(Method::PATCH, &path, auth_token, body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Dentist not found"))?;

        Ok(serde_json::from_value(row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn activation_period_matches_plan() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(activation_end(now, PlanType::Monthly), now + Duration::days(30));
        assert_eq!(activation_end(now, PlanType::Annual), now + Duration::days(360));
    }

    #[test]
    fn extension_is_additive_on_future_end_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let current_end = now + Duration::days(10);

        let new_end = extended_end(Some(current_end), now, 2);
        assert_eq!(new_end, current_end + Duration::days(60));
    }

    #[test]
    fn extension_restarts_from_now_when_end_date_passed() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let lapsed_end = now - Duration::days(5);

        let new_end = extended_end(Some(lapsed_end), now, 1);
        assert_eq!(new_end, now + Duration::days(30));
    }

    #[test]
    fn extension_restarts_from_now_when_no_end_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(extended_end(None, now, 3), now + Duration::days(90));
    }
}
