use chrono::Utc;
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::database::CredentialStore;
use crate::errors::{AppError, Result};
use crate::models::otp::NewOtpSession;
use crate::services::hashing::{hash_secret, verify_secret};
use crate::services::mail_service::OtpNotifier;
use crate::services::token_service::TokenService;
use crate::services::validation::{ensure_email, ensure_otp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeReceipt {
    pub delivered: bool,
}

#[derive(Debug, Clone)]
pub struct VerifiedLogin {
    pub doctor_id: Uuid,
    pub access_token: String,
}

/// Email OTP login: issues challenges and verifies them.
#[derive(Clone)]
pub struct OTPService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn OtpNotifier>,
    tokens: TokenService,
    config: AuthConfig,
}

impl OTPService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn OtpNotifier>,
        tokens: TokenService,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
            config,
        }
    }

    /// Uniform 6-digit code in 100000..=999999 from the OS CSPRNG.
    pub fn generate_otp() -> String {
        OsRng.gen_range(100_000..=999_999u32).to_string()
    }

    /// Issue a fresh challenge for `email`. Any earlier unused challenge is
    /// invalidated before the new one is stored, whether or not delivery
    /// then succeeds.
    pub async fn request_challenge(&self, email: &str) -> Result<ChallengeReceipt> {
        ensure_email(email)?;

        let otp = Self::generate_otp();
        let otp_hash = hash_secret(&otp, self.config.bcrypt_cost).await?;

        let now = Utc::now();
        let session = self
            .store
            .replace_otp_session(NewOtpSession {
                email: email.to_string(),
                otp_hash,
                created_at: now,
                expires_at: now + self.config.otp_ttl,
            })
            .await?;

        tracing::info!(session_id = %session.id, expires_at = %session.expires_at, "OTP challenge issued");

        match self.notifier.send_otp(email, &otp).await {
            Ok(()) => Ok(ChallengeReceipt { delivered: true }),
            Err(e) => {
                tracing::error!(session_id = %session.id, error = %e, "failed to deliver OTP");
                Err(match e {
                    e @ AppError::DeliveryFailure(_) => e,
                    other => AppError::delivery(other.to_string()),
                })
            }
        }
    }

    /// Check `code` against the newest active challenge for `email` and, on
    /// success, log the doctor in.
    pub async fn verify(&self, email: &str, code: &str) -> Result<VerifiedLogin> {
        ensure_email(email)?;
        ensure_otp(code)?;

        let now = Utc::now();
        let session = self
            .store
            .latest_active_otp_session(email, now)
            .await?
            .ok_or(AppError::ChallengeNotFound)?;

        // Guesses racing each other can all pass this check before the
        // first increment lands; the stored counter is still clamped.
        if session.attempts >= self.config.max_otp_attempts {
            tracing::warn!(session_id = %session.id, "OTP session exhausted");
            return Err(AppError::TooManyAttempts);
        }

        if !verify_secret(code, &session.otp_hash).await? {
            let attempts = self
                .store
                .record_failed_attempt(session.id, self.config.max_otp_attempts)
                .await?;
            tracing::info!(session_id = %session.id, attempts, "OTP mismatch");
            return Err(AppError::InvalidCode);
        }

        // A concurrent request may have consumed the session between the
        // select above and here; only one of them gets through.
        if !self.store.consume_otp_session(session.id).await? {
            return Err(AppError::ChallengeNotFound);
        }

        let doctor = self.store.upsert_doctor(email, Utc::now()).await?;
        let access_token = self.tokens.issue(doctor.id, &doctor.email)?;

        tracing::info!(doctor_id = %doctor.id, session_id = %session.id, "doctor logged in");

        Ok(VerifiedLogin {
            doctor_id: doctor.id,
            access_token,
        })
    }
}
