//! Input validation utilities
//!
//! Shape checks on free-form fields return a plain message; rules about
//! referenced entities and quantities return the API error directly.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::config::QuantityLimits;
use crate::error::ApiError;

/// Check that a referenced-id list is non-empty and free of duplicates
pub fn validate_items(ids: &[Uuid], field: &'static str) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Err(ApiError::EmptyField { field });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(ApiError::DuplicateEntry { field });
        }
    }

    Ok(())
}

/// Check an ingredient amount against the configured bounds
pub fn validate_amount(amount: i32, limits: &QuantityLimits) -> Result<(), ApiError> {
    if amount < limits.min_amount || amount > limits.max_amount {
        return Err(ApiError::OutOfRange {
            field: "amount",
            min: limits.min_amount,
            max: limits.max_amount,
        });
    }

    Ok(())
}

/// Check a cooking time against the configured lower bound
pub fn validate_cooking_time(cooking_time: i32, limits: &QuantityLimits) -> Result<(), ApiError> {
    if cooking_time < limits.min_cooking_time {
        return Err(ApiError::TooSmall {
            field: "cooking_time",
            min: limits.min_cooking_time,
        });
    }

    Ok(())
}

/// Reject subscriptions that point back at the subscriber
pub fn validate_not_self(follower: Uuid, followed: Uuid) -> Result<(), ApiError> {
    if follower == followed {
        return Err(ApiError::SelfFollow);
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > 150 {
        return Err("Username must be at most 150 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, digits, and the characters @ . + - _".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }

    Ok(())
}

/// Validate a person or recipe name field
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("This field is required".to_string());
    }

    if name.chars().count() > 150 {
        return Err("This field must be at most 150 characters long".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_items() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(validate_items(&[a, b], "tags").is_ok());
        assert!(matches!(
            validate_items(&[], "tags"),
            Err(ApiError::EmptyField { field: "tags" })
        ));
        assert!(matches!(
            validate_items(&[a, b, a], "ingredients"),
            Err(ApiError::DuplicateEntry {
                field: "ingredients"
            })
        ));
    }

    #[test]
    fn test_validate_amount_bounds() {
        let limits = QuantityLimits::default();

        assert!(validate_amount(1, &limits).is_ok());
        assert!(validate_amount(32_000, &limits).is_ok());
        assert!(matches!(
            validate_amount(0, &limits),
            Err(ApiError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_amount(32_001, &limits),
            Err(ApiError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_cooking_time() {
        let limits = QuantityLimits::default();

        assert!(validate_cooking_time(1, &limits).is_ok());
        assert!(matches!(
            validate_cooking_time(0, &limits),
            Err(ApiError::TooSmall { .. })
        ));
    }

    #[test]
    fn test_validate_not_self() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(validate_not_self(a, b).is_ok());
        assert!(matches!(validate_not_self(a, a), Err(ApiError::SelfFollow)));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("chef.2024").is_ok());
        assert!(validate_username("søren+kitchen").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("not allowed").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("cook@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("soup-and-bread").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Pho").is_ok());
        assert!(validate_name("   ").is_err());
    }
}
