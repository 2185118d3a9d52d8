use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One issued login challenge. Rows are never deleted; `used` is the
/// terminal flag for both successful verification and supersession.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OtpSession {
    pub id: Uuid,
    pub email: String,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OtpSession {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewOtpSession {
    pub email: String,
    pub otp_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
