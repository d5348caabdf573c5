use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::dentist::{DentistProfile, SubscriptionStatus};

use crate::models::{AuthSession, RegisterRequest, SignInRequest};

/// Every new account starts on a one-week trial.
pub const TRIAL_DAYS: i64 = 7;

pub struct AuthService {
    supabase: SupabaseClient,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Creates the identity-provider account and the dentist profile row in
    /// one go. The profile starts in `trial` with the trial clock running.
    pub async fn register(&self, request: RegisterRequest) -> Result<(AuthSession, DentistProfile)> {
        debug!("Registering account for {}", request.email);

        let signup_body = json!({
            "email": request.email,
            "password": request.password,
        });

        let response: Value = self.supabase.request(
            Method::POST,
            "/auth/v1/signup",
            None,
            Some(signup_body),
        ).await?;

        let session = parse_session(&response)?;

        let now = Utc::now();
        let trial_ends_at = now + Duration::days(TRIAL_DAYS);
        let profile_body = json!({
            "id": session.user_id,
            "email": request.email,
            "display_name": request.display_name,
            "license_number": request.license_number,
            "specialization": request.specialization,
            "phone": request.phone,
            "clinic_name": request.clinic_name,
            "clinic_address": request.clinic_address,
            "subscription_status": SubscriptionStatus::Trial,
            "trial_ends_at": trial_ends_at,
            "subscription_ends_at": null,
            "plan_type": null,
            "last_payment_date": null,
            "created_at": now,
            "updated_at": now,
        });

        let result = self.supabase
            .write_returning(Method::POST, "/rest/v1/dentists", &session.access_token, profile_body)
            .await?;

        let row = result.into_iter().next()
            .ok_or_else(|| anyhow!("Failed to create dentist profile"))?;
        let profile: DentistProfile = serde_json::from_value(row)?;

        info!("Registered dentist {} with trial until {}", profile.id, trial_ends_at);
        Ok((session, profile))
    }

    pub async fn sign_in(&self, request: SignInRequest) -> Result<(AuthSession, Option<DentistProfile>)> {
        debug!("Signing in {}", request.email);

        let body = json!({
            "email": request.email,
            "password": request.password,
        });

        let response: Value = self.supabase.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(body),
        ).await?;

        let session = parse_session(&response)?;
        let profile = self.get_dentist_profile(&session.user_id, &session.access_token).await?;

        Ok((session, profile))
    }

    /// Asks the identity provider to send a password recovery email. Always
    /// succeeds from the caller's point of view so addresses can't be probed.
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        debug!("Requesting password recovery");

        let body = json!({ "email": email });
        let _: Value = self.supabase.request(
            Method::POST,
            "/auth/v1/recover",
            None,
            Some(body),
        ).await.unwrap_or(Value::Null);

        Ok(())
    }

    pub async fn get_dentist_profile(
        &self,
        dentist_id: &str,
        auth_token: &str,
    ) -> Result<Option<DentistProfile>> {
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
}

fn parse_session(response: &Value) -> Result<AuthSession> {
    let access_token = response["access_token"].as_str()
        .ok_or_else(|| anyhow!("Identity provider returned no access token"))?
        .to_string();
    let user_id = response["user"]["id"].as_str()
        .ok_or_else(|| anyhow!("Identity provider returned no user id"))?
        .to_string();

    Ok(AuthSession {
        access_token,
        refresh_token: response["refresh_token"].as_str().map(str::to_string),
        expires_in: response["expires_in"].as_u64(),
        user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_parses_token_and_user() {
        let response = json!({
            "access_token": "token-abc",
            "refresh_token": "refresh-xyz",
            "expires_in": 3600,
            "user": { "id": "user-1", "email": "doc@example.com" }
        });

        let session = parse_session(&response).unwrap();
        assert_eq!(session.access_token, "token-abc");
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.expires_in, Some(3600));
    }

    #[test]
    fn session_without_token_is_rejected() {
        let response = json!({ "user": { "id": "user-1" } });
        assert!(parse_session(&response).is_err());
    }
}
