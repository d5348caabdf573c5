//! Field-level validation and sanitization for user-entered data.
//!
//! Every function is pure; failures carry the message shown next to the
//! offending form control and are never propagated past the handler.

use chrono::{DateTime, Datelike, Duration, Utc};
use regex::Regex;
use std::sync::OnceLock;

pub type ValidationResult = Result<(), String>;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Accepts +34 XXX XXX XXX, XXX-XXX-XXX, XXXXXXXXX and similar
    RE.get_or_init(|| {
        Regex::new(r"^[\+]?[(]?[0-9]{1,4}[)]?[-\s\.]?[(]?[0-9]{1,4}[)]?[-\s\.]?[0-9]{1,9}$").unwrap()
    })
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]+$").unwrap())
}

pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err("Email is required".to_string());
    }

    if !email_regex().is_match(trimmed) {
        return Err("Invalid email".to_string());
    }

    Ok(())
}

pub fn validate_phone(phone: &str) -> ValidationResult {
    let trimmed = phone.trim();

    if trimmed.is_empty() {
        return Err("Phone number is required".to_string());
    }

    if !phone_regex().is_match(trimmed) {
        return Err("Invalid phone number".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }

    Ok(())
}

pub fn validate_name(name: &str, field_name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(format!("The {} is required", field_name));
    }

    if trimmed.chars().count() < 2 {
        return Err(format!("The {} must be at least 2 characters", field_name));
    }

    if !name_regex().is_match(trimmed) {
        return Err(format!("The {} may only contain letters", field_name));
    }

    Ok(())
}

pub fn validate_date_of_birth(date: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult {
    if date > now {
        return Err("Date cannot be in the future".to_string());
    }

    if now.year() - date.year() > 150 {
        return Err("Date looks incorrect".to_string());
    }

    Ok(())
}

pub fn validate_positive_number(value: f64, field_name: &str) -> ValidationResult {
    if value.is_nan() {
        return Err(format!("The {} must be a number", field_name));
    }

    if value < 0.0 {
        return Err(format!("The {} cannot be negative", field_name));
    }

    Ok(())
}

pub fn validate_price(price: f64) -> ValidationResult {
    validate_positive_number(price, "price")?;

    if price > 1_000_000.0 {
        return Err("Price looks too high".to_string());
    }

    Ok(())
}

pub fn validate_appointment_date(date: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult {
    let today = now.date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();
    let max_date = now + Duration::days(365 * 2);

    if date < today {
        return Err("Date cannot be in the past".to_string());
    }

    if date > max_date {
        return Err("Date is too far in the future".to_string());
    }

    Ok(())
}

pub fn validate_license_number(license: &str) -> ValidationResult {
    let trimmed = license.trim();

    if trimmed.is_empty() {
        return Err("License number is required".to_string());
    }

    if trimmed.chars().count() < 4 {
        return Err("License number must be at least 4 characters".to_string());
    }

    Ok(())
}

/// Strips markup delimiters and script-injection fragments.
pub fn sanitize_string(input: &str) -> String {
    static JS_PROTO: OnceLock<Regex> = OnceLock::new();
    static EVENT_ATTR: OnceLock<Regex> = OnceLock::new();

    let js_proto = JS_PROTO.get_or_init(|| Regex::new(r"(?i)javascript:").unwrap());
    let event_attr = EVENT_ATTR.get_or_init(|| Regex::new(r"(?i)on\w+=").unwrap());

    let trimmed = input.trim().replace(['<', '>'], "");
    let no_proto = js_proto.replace_all(&trimmed, "");
    event_attr.replace_all(&no_proto, "").into_owned()
}

pub fn validate_and_sanitize_text(text: &str, max_length: usize) -> Result<String, String> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("Field cannot be empty".to_string());
    }

    if trimmed.chars().count() > max_length {
        return Err(format!("Text cannot exceed {} characters", max_length));
    }

    Ok(sanitize_string(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn email_accepts_plain_addresses() {
        assert!(validate_email("dentist@clinic.com").is_ok());
        assert!(validate_email("  padded@clinic.com  ").is_ok());
    }

    #[test]
    fn email_rejects_missing_parts() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn phone_accepts_common_formats() {
        assert!(validate_phone("+34 600 123 123").is_ok());
        assert!(validate_phone("600-123-123").is_ok());
        assert!(validate_phone("341234567").is_ok());
    }

    #[test]
    fn phone_rejects_letters() {
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn password_needs_six_chars() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn name_allows_accented_letters() {
        assert!(validate_name("María José", "first name").is_ok());
        assert!(validate_name("X", "first name").is_err());
        assert!(validate_name("R2D2", "first name").is_err());
    }

    #[test]
    fn date_of_birth_bounds() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(validate_date_of_birth(now - Duration::days(365 * 30), now).is_ok());
        assert!(validate_date_of_birth(now + Duration::days(1), now).is_err());
        assert!(validate_date_of_birth(Utc.with_ymd_and_hms(1850, 1, 1, 0, 0, 0).unwrap(), now).is_err());
    }

    #[test]
    fn price_limits() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(1_000_001.0).is_err());
    }

    #[test]
    fn appointment_date_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        // Earlier the same day still counts as today
        assert!(validate_appointment_date(now - Duration::hours(6), now).is_ok());
        assert!(validate_appointment_date(now - Duration::days(1), now).is_err());
        assert!(validate_appointment_date(now + Duration::days(800), now).is_err());
    }

    #[test]
    fn sanitize_strips_injection_fragments() {
        assert_eq!(sanitize_string("<b>bold</b>"), "bbold/b");
        assert_eq!(sanitize_string("javascript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_string("x onclick=evil()"), "x evil()");
    }

    #[test]
    fn text_length_enforced() {
        assert!(validate_and_sanitize_text("fine", 10).is_ok());
        assert!(validate_and_sanitize_text("too long here", 5).is_err());
        assert!(validate_and_sanitize_text("   ", 5).is_err());
    }
}
