//! Shape checks shared by the HTTP layer and the services. The services
//! re-run them so nothing malformed ever reaches the store.

use validator::ValidateEmail;

use crate::errors::{AppError, Result};

pub const OTP_LENGTH: usize = 6;
pub const PIN_MIN_LENGTH: usize = 4;
pub const PIN_MAX_LENGTH: usize = 6;

/// RFC-shaped address whose domain also carries a dot, so single-label
/// hosts such as `localhost` are refused.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
}

pub fn is_valid_otp(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// `^\d{4,6}$`
pub fn is_valid_pin(pin: &str) -> bool {
    (PIN_MIN_LENGTH..=PIN_MAX_LENGTH).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}

pub fn ensure_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::invalid_input("Invalid email format"))
    }
}

pub fn ensure_otp(code: &str) -> Result<()> {
    if is_valid_otp(code) {
        Ok(())
    } else {
        Err(AppError::invalid_input("Email and 6-digit OTP are required"))
    }
}

pub fn ensure_pin(pin: &str) -> Result<()> {
    if is_valid_pin(pin) {
        Ok(())
    } else {
        Err(AppError::invalid_input("PIN must be a numeric string of 4-6 digits"))
    }
}
