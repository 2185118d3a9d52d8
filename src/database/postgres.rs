use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::CredentialStore;
use crate::errors::Result;
use crate::models::doctor::{Doctor, UpdateDoctor};
use crate::models::otp::{NewOtpSession, OtpSession};

const OTP_COLUMNS: &str = "id, email, otp_hash, expires_at, used, attempts, created_at";

const DOCTOR_COLUMNS: &str = "id, email, name, phone, registration_no, specialization, \
    clinic_name, clinic_address, clinic_logo_url, abha_id, pin_hash, pin_set, \
    is_verified, created_at, updated_at";

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn replace_otp_session(&self, session: NewOtpSession) -> Result<OtpSession> {
        let mut tx = self.pool.begin().await?;

        let superseded = sqlx::query("UPDATE otp_sessions SET used = TRUE WHERE email = $1 AND used = FALSE")
            .bind(&session.email)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let inserted = sqlx::query_as::<_, OtpSession>(&format!(
            "INSERT INTO otp_sessions (id, email, otp_hash, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            OTP_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&session.email)
        .bind(&session.otp_hash)
        .bind(session.expires_at)
        .bind(session.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if superseded > 0 {
            tracing::debug!(superseded, "invalidated previous OTP sessions");
        }
        Ok(inserted)
    }

    async fn latest_active_otp_session(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpSession>> {
        let session = sqlx::query_as::<_, OtpSession>(&format!(
            "SELECT {} FROM otp_sessions \
             WHERE email = $1 AND used = FALSE AND expires_at > $2 \
             ORDER BY created_at DESC LIMIT 1",
            OTP_COLUMNS
        ))
        .bind(email)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn record_failed_attempt(&self, session_id: Uuid, ceiling: i32) -> Result<i32> {
        let attempts: i32 = sqlx::query_scalar(
            "UPDATE otp_sessions SET attempts = LEAST(attempts + 1, $2) WHERE id = $1 RETURNING attempts",
        )
        .bind(session_id)
        .bind(ceiling)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn consume_otp_session(&self, session_id: Uuid) -> Result<bool> {
        let result = sqlx::query("UPDATE otp_sessions SET used = TRUE WHERE id = $1 AND used = FALSE")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn otp_sessions_for(&self, email: &str) -> Result<Vec<OtpSession>> {
        let sessions = sqlx::query_as::<_, OtpSession>(&format!(
            "SELECT {} FROM otp_sessions WHERE email = $1 ORDER BY created_at DESC",
            OTP_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn upsert_doctor(&self, email: &str, now: DateTime<Utc>) -> Result<Doctor> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            "INSERT INTO doctors (id, email, created_at, updated_at) VALUES ($1, $2, $3, $3) \
             ON CONFLICT (email) DO UPDATE SET updated_at = EXCLUDED.updated_at \
             RETURNING {}",
            DOCTOR_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(doctor)
    }

    async fn find_doctor(&self, id: Uuid) -> Result<Option<Doctor>> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {} FROM doctors WHERE id = $1",
            DOCTOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doctor)
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {} FROM doctors WHERE email = $1",
            DOCTOR_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doctor)
    }

    async fn set_pin_hash_once(
        &self,
        doctor_id: Uuid,
        pin_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE doctors SET pin_hash = $1, pin_set = TRUE, updated_at = $2 \
             WHERE id = $3 AND pin_set = FALSE",
        )
        .bind(pin_hash)
        .bind(now)
        .bind(doctor_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_doctor(
        &self,
        doctor_id: Uuid,
        update: &UpdateDoctor,
        now: DateTime<Utc>,
    ) -> Result<Option<Doctor>> {
        let doctor = sqlx::query_as::<_, Doctor>(&format!(
            "UPDATE doctors SET \
                name = COALESCE($1, name), \
                phone = COALESCE($2, phone), \
                registration_no = COALESCE($3, registration_no), \
                specialization = COALESCE($4, specialization), \
                clinic_name = COALESCE($5, clinic_name), \
                clinic_address = COALESCE($6, clinic_address), \
                clinic_logo_url = COALESCE($7, clinic_logo_url), \
                abha_id = COALESCE($8, abha_id), \
                updated_at = $9 \
             WHERE id = $10 RETURNING {}",
            DOCTOR_COLUMNS
        ))
        .bind(update.name.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.registration_no.as_deref())
        .bind(update.specialization.as_deref())
        .bind(update.clinic_name.as_deref())
        .bind(update.clinic_address.as_deref())
        .bind(update.clinic_logo_url.as_deref())
        .bind(update.abha_id.as_deref())
        .bind(now)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doctor)
    }
}
