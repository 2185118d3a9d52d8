use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::errors::{AppError, Result};
use crate::models::doctor::Claims;

/// Mints and checks HS256 bearer tokens. Validity is signature + expiry
/// only; there is no server-side session to consult.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: config.token_ttl,
        }
    }

    pub fn issue(&self, doctor_id: Uuid, email: &str) -> Result<String> {
        self.issue_at(doctor_id, email, Utc::now())
    }

    pub fn issue_at(&self, doctor_id: Uuid, email: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal("token expiry overflow".to_string()))?;

        let claims = Claims {
            sub: doctor_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AppError::Unauthorized
            })
    }
}
