use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::CredentialStore;
use crate::errors::{AppError, Result};
use crate::services::hashing::{hash_secret, verify_secret};
use crate::services::validation::ensure_pin;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PinVerification {
    pub verified: bool,
}

/// Prescription signing PIN: set once, verified on every sign-off.
#[derive(Clone)]
pub struct PinService {
    store: Arc<dyn CredentialStore>,
    bcrypt_cost: u32,
}

impl PinService {
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    pub async fn set_pin(&self, doctor_id: Uuid, pin: &str) -> Result<()> {
        ensure_pin(pin)?;

        let doctor = self
            .store
            .find_doctor(doctor_id)
            .await?
            .ok_or(AppError::NotFound("Doctor"))?;

        if doctor.pin_set {
            return Err(AppError::PinAlreadySet);
        }

        let pin_hash = hash_secret(pin, self.bcrypt_cost).await?;

        // Conditional write: a concurrent set that landed first wins and
        // this one reports the PIN as already set.
        if !self
            .store
            .set_pin_hash_once(doctor_id, &pin_hash, Utc::now())
            .await?
        {
            return Err(AppError::PinAlreadySet);
        }

        tracing::info!(doctor_id = %doctor_id, "signing PIN set");
        Ok(())
    }

    pub async fn verify_pin(&self, doctor_id: Uuid, pin: &str) -> Result<PinVerification> {
        ensure_pin(pin)?;

        let doctor = self
            .store
            .find_doctor(doctor_id)
            .await?
            .ok_or(AppError::NotFound("Doctor"))?;

        let pin_hash = match doctor.pin_hash.as_deref() {
            Some(hash) if doctor.has_pin() => hash,
            _ => return Err(AppError::PinNotSet),
        };

        if !verify_secret(pin, pin_hash).await? {
            tracing::info!(doctor_id = %doctor_id, "signing PIN mismatch");
            return Err(AppError::InvalidPin);
        }

        Ok(PinVerification { verified: true })
    }
}
