use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::doctor::{Doctor, UpdateDoctor};
use crate::models::otp::{NewOtpSession, OtpSession};

/// Persistence seam for OTP sessions and doctor credentials.
///
/// Every method that mutates state must be a single atomic step in the
/// backing store. Callers never read-then-write across two calls to get
/// the guarantees below.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Mark every unused session for `session.email` as used, then insert
    /// the new one. Both happen or neither does.
    async fn replace_otp_session(&self, session: NewOtpSession) -> Result<OtpSession>;

    /// The most recently created session for `email` that is unused and
    /// expires strictly after `now`.
    async fn latest_active_otp_session(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpSession>>;

    /// Increment the attempt counter, clamped at `ceiling`. Returns the
    /// counter after the increment.
    async fn record_failed_attempt(&self, session_id: Uuid, ceiling: i32) -> Result<i32>;

    /// Flip `used` from false to true. Returns `false` when the session was
    /// already used, so at most one caller ever wins.
    async fn consume_otp_session(&self, session_id: Uuid) -> Result<bool>;

    /// All sessions ever issued for `email`, newest first.
    async fn otp_sessions_for(&self, email: &str) -> Result<Vec<OtpSession>>;

    /// Insert a doctor for `email`, or only bump `updated_at` if one exists.
    async fn upsert_doctor(&self, email: &str, now: DateTime<Utc>) -> Result<Doctor>;

    async fn find_doctor(&self, id: Uuid) -> Result<Option<Doctor>>;

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>>;

    /// Store `pin_hash` only if no PIN is set yet. Returns `false` when the
    /// doctor is missing or already has a PIN; the stored hash is untouched
    /// in that case.
    async fn set_pin_hash_once(
        &self,
        doctor_id: Uuid,
        pin_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Apply the provided profile fields. `None` when the doctor is missing.
    async fn update_doctor(
        &self,
        doctor_id: Uuid,
        update: &UpdateDoctor,
        now: DateTime<Utc>,
    ) -> Result<Option<Doctor>>;
}
