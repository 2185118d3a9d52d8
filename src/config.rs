// config.rs
use chrono::Duration;
use std::env;

use crate::errors::{AppError, Result};

/// Settings the auth services need. Built once at startup and handed to
/// each service by value; nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub otp_ttl: Duration,
    pub max_otp_attempts: i32,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub const DEFAULT_OTP_TTL_SECS: i64 = 5 * 60;
    pub const DEFAULT_MAX_OTP_ATTEMPTS: i32 = 3;
    pub const DEFAULT_TOKEN_TTL: &'static str = "7d";

    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::days(7),
            otp_ttl: Duration::seconds(Self::DEFAULT_OTP_TTL_SECS),
            max_otp_attempts: Self::DEFAULT_MAX_OTP_ATTEMPTS,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    /// `None` means OTPs are written to the log instead of mailed.
    pub email: Option<EmailConfig>,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = required("JWT_SECRET")?;

        let token_ttl = parse_duration(
            &env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| AuthConfig::DEFAULT_TOKEN_TTL.to_string()),
        )?;

        let otp_ttl = Duration::seconds(parse_var("OTP_TTL_SECONDS", AuthConfig::DEFAULT_OTP_TTL_SECS)?);
        let max_otp_attempts = parse_var("OTP_MAX_ATTEMPTS", AuthConfig::DEFAULT_MAX_OTP_ATTEMPTS)?;
        let bcrypt_cost = parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?;

        if max_otp_attempts < 1 {
            return Err(AppError::configuration("OTP_MAX_ATTEMPTS must be at least 1"));
        }
        if otp_ttl <= Duration::zero() {
            return Err(AppError::configuration("OTP_TTL_SECONDS must be positive"));
        }

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::configuration(format!(
                    "STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(AppError::configuration("DATABASE_URL must be set"));
        }

        let email = match (env::var("EMAIL_API_KEY"), env::var("EMAIL_SENDER")) {
            (Ok(api_key), Ok(sender)) => Some(EmailConfig {
                api_url: env::var("EMAIL_API_URL")
                    .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
                api_key,
                sender,
            }),
            _ => None,
        };

        Ok(AppConfig {
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
                otp_ttl,
                max_otp_attempts,
                bcrypt_cost,
            },
            store_backend,
            database_url,
            email,
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::configuration(format!("{} must be set", key)))
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} is not a valid number: '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

/// Parse a token lifetime such as `"3600"`, `"90s"`, `"15m"`, `"12h"` or `"7d"`.
/// A bare number is taken as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let invalid = || AppError::configuration(format!("invalid duration: '{}'", raw));

    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let amount: i64 = digits.parse().map_err(|_| invalid())?;

    let duration = match unit {
        "" | "s" => Duration::seconds(amount),
        "m" => Duration::minutes(amount),
        "h" => Duration::hours(amount),
        "d" => Duration::days(amount),
        _ => return Err(invalid()),
    };

    if duration <= Duration::zero() {
        return Err(invalid());
    }
    Ok(duration)
}
