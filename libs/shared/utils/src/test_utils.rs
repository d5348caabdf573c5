use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub admin_emails: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            admin_emails: vec!["admin@dentos.app".to_string()],
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            admin_emails: self.admin_emails.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    pub fn with_mock_server(url: &str) -> AppConfig {
        let mut config = TestConfig::default().to_app_config();
        config.supabase_url = url.to_string();
        config
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "dentist".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn dentist(email: &str) -> Self {
        Self::new(email, "dentist")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    /// Row shape of the `dentists` table as PostgREST returns it.
    pub fn dentist_profile_row(dentist_id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": dentist_id,
            "email": "dentist@example.com",
            "display_name": "Dr. Example",
            "license_number": "MP-12345",
            "specialization": null,
            "phone": null,
            "clinic_name": "Example Dental",
            "clinic_address": null,
            "subscription_status": status,
            "trial_ends_at": "2099-01-01T00:00:00Z",
            "subscription_ends_at": null,
            "plan_type": null,
            "last_payment_date": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_row(patient_id: Uuid, dentist_id: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "dentist_id": dentist_id,
            "first_name": "Ana",
            "last_name": "García",
            "email": "ana@example.com",
            "phone": "600123123",
            "date_of_birth": "1990-05-15T00:00:00Z",
            "address": null,
            "medical_notes": null,
            "group_name": null,
            "monthly_price": null,
            "last_monthly_payment": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn stock_item_row(item_id: Uuid, dentist_id: &str, quantity: i64, min_quantity: i64) -> serde_json::Value {
        json!({
            "id": item_id,
            "dentist_id": dentist_id,
            "name": "Composite resin",
            "category": "material",
            "quantity": quantity,
            "unit": "units",
            "min_quantity": min_quantity,
            "location": null,
            "supplier": null,
            "cost": 12.5,
            "notes": null,
            "expiration_date": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn transaction_row(tx_id: Uuid, dentist_id: &str, tx_type: &str, amount: f64,
                           status: &str, is_possible: bool, date: &str) -> serde_json::Value {
        json!({
            "id": tx_id,
            "dentist_id": dentist_id,
            "type": tx_type,
            "amount": amount,
            "category": "treatment",
            "concept": "Test entry",
            "date": date,
            "payment_method": "cash",
            "status": status,
            "is_possible": is_possible,
            "patient_id": null,
            "appointment_id": null,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
