use sqlx::PgPool;

use crate::errors::Result;

const CREATE_DOCTORS: &str = "
CREATE TABLE IF NOT EXISTS doctors (
    id              UUID PRIMARY KEY,
    email           TEXT NOT NULL UNIQUE,
    name            TEXT,
    phone           TEXT,
    registration_no TEXT,
    specialization  TEXT,
    clinic_name     TEXT,
    clinic_address  TEXT,
    clinic_logo_url TEXT,
    abha_id         TEXT,
    pin_hash        TEXT,
    pin_set         BOOLEAN NOT NULL DEFAULT FALSE,
    is_verified     BOOLEAN NOT NULL DEFAULT FALSE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT pin_set_matches_hash CHECK (pin_set = (pin_hash IS NOT NULL))
)";

const CREATE_OTP_SESSIONS: &str = "
CREATE TABLE IF NOT EXISTS otp_sessions (
    id         UUID PRIMARY KEY,
    email      TEXT NOT NULL,
    otp_hash   TEXT NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL,
    used       BOOLEAN NOT NULL DEFAULT FALSE,
    attempts   INTEGER NOT NULL DEFAULT 0 CHECK (attempts >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const CREATE_OTP_SESSIONS_INDEX: &str = "
CREATE INDEX IF NOT EXISTS otp_sessions_email_created_idx
    ON otp_sessions (email, created_at DESC)";

/// Create the auth tables if they do not exist yet.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for statement in [CREATE_DOCTORS, CREATE_OTP_SESSIONS, CREATE_OTP_SESSIONS_INDEX] {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("database schema is up to date");
    Ok(())
}
