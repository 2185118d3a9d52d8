use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::store::CredentialStore;
use crate::errors::{AppError, Result};
use crate::models::doctor::{Doctor, UpdateDoctor};
use crate::models::otp::{NewOtpSession, OtpSession};

/// In-process store for tests and `STORE_BACKEND=memory`. Each method
/// holds the lock for its whole read-modify-write, which gives the same
/// atomicity the Postgres statements do.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    otp_sessions: Vec<OtpSession>,
    doctors: Vec<Doctor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn replace_otp_session(&self, session: NewOtpSession) -> Result<OtpSession> {
        let mut tables = self.inner.lock().await;

        for existing in tables
            .otp_sessions
            .iter_mut()
            .filter(|s| s.email == session.email && !s.used)
        {
            existing.used = true;
        }

        let inserted = OtpSession {
            id: Uuid::new_v4(),
            email: session.email,
            otp_hash: session.otp_hash,
            expires_at: session.expires_at,
            used: false,
            attempts: 0,
            created_at: session.created_at,
        };
        tables.otp_sessions.push(inserted.clone());

        Ok(inserted)
    }

    async fn latest_active_otp_session(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpSession>> {
        let tables = self.inner.lock().await;

        // Later pushes win ties on created_at, matching insertion order.
        let latest = tables
            .otp_sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.email == email && s.is_active(now))
            .max_by_key(|(idx, s)| (s.created_at, *idx))
            .map(|(_, s)| s.clone());

        Ok(latest)
    }

    async fn record_failed_attempt(&self, session_id: Uuid, ceiling: i32) -> Result<i32> {
        let mut tables = self.inner.lock().await;

        let session = tables
            .otp_sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| AppError::store(format!("otp session {} vanished", session_id)))?;

        session.attempts = (session.attempts + 1).min(ceiling);
        Ok(session.attempts)
    }

    async fn consume_otp_session(&self, session_id: Uuid) -> Result<bool> {
        let mut tables = self.inner.lock().await;

        match tables
            .otp_sessions
            .iter_mut()
            .find(|s| s.id == session_id && !s.used)
        {
            Some(session) => {
                session.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn otp_sessions_for(&self, email: &str) -> Result<Vec<OtpSession>> {
        let tables = self.inner.lock().await;

        let mut sessions: Vec<(usize, OtpSession)> = tables
            .otp_sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.email == email)
            .map(|(idx, s)| (idx, s.clone()))
            .collect();
        sessions.sort_by(|(ia, a), (ib, b)| (b.created_at, ib).cmp(&(a.created_at, ia)));

        Ok(sessions.into_iter().map(|(_, s)| s).collect())
    }

    async fn upsert_doctor(&self, email: &str, now: DateTime<Utc>) -> Result<Doctor> {
        let mut tables = self.inner.lock().await;

        if let Some(existing) = tables.doctors.iter_mut().find(|d| d.email == email) {
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let doctor = Doctor::new(email, now);
        tables.doctors.push(doctor.clone());
        Ok(doctor)
    }

    async fn find_doctor(&self, id: Uuid) -> Result<Option<Doctor>> {
        let tables = self.inner.lock().await;
        Ok(tables.doctors.iter().find(|d| d.id == id).cloned())
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>> {
        let tables = self.inner.lock().await;
        Ok(tables.doctors.iter().find(|d| d.email == email).cloned())
    }

    async fn set_pin_hash_once(
        &self,
        doctor_id: Uuid,
        pin_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.inner.lock().await;

        match tables
            .doctors
            .iter_mut()
            .find(|d| d.id == doctor_id && !d.pin_set)
        {
            Some(doctor) => {
                doctor.pin_hash = Some(pin_hash.to_string());
                doctor.pin_set = true;
                doctor.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_doctor(
        &self,
        doctor_id: Uuid,
        update: &UpdateDoctor,
        now: DateTime<Utc>,
    ) -> Result<Option<Doctor>> {
        let mut tables = self.inner.lock().await;

        Ok(tables
            .doctors
            .iter_mut()
            .find(|d| d.id == doctor_id)
            .map(|doctor| {
                doctor.apply(update, now);
                doctor.clone()
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_session(email: &str, created_at: DateTime<Utc>) -> NewOtpSession {
        NewOtpSession {
            email: email.to_string(),
            otp_hash: "hash".to_string(),
            created_at,
            expires_at: created_at + Duration::minutes(5),
        }
    }

    #[tokio::test]
    async fn replacing_a_session_invalidates_the_previous_one() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let first = store.replace_otp_session(new_session("doc@x.com", now)).await.unwrap();
        let second = store
            .replace_otp_session(new_session("doc@x.com", now + Duration::seconds(1)))
            .await
            .unwrap();

        let sessions = store.otp_sessions_for("doc@x.com").await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
        assert!(!sessions[0].used);
        assert_eq!(sessions[1].id, first.id);
        assert!(sessions[1].used);
    }

    #[tokio::test]
    async fn other_identities_are_not_invalidated() {
        let store = MemoryStore::new();
        let now = Utc::now();

        store.replace_otp_session(new_session("a@x.com", now)).await.unwrap();
        store.replace_otp_session(new_session("b@x.com", now)).await.unwrap();

        assert!(store.latest_active_otp_session("a@x.com", now).await.unwrap().is_some());
        assert!(store.latest_active_otp_session("b@x.com", now).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_sessions_are_not_selected() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.replace_otp_session(new_session("doc@x.com", now)).await.unwrap();

        let later = now + Duration::minutes(5);
        assert!(store.latest_active_otp_session("doc@x.com", later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_attempts_are_clamped_at_the_ceiling() {
        let store = MemoryStore::new();
        let session = store
            .replace_otp_session(new_session("doc@x.com", Utc::now()))
            .await
            .unwrap();

        for expected in [1, 2, 3, 3] {
            assert_eq!(store.record_failed_attempt(session.id, 3).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn a_session_can_only_be_consumed_once() {
        let store = MemoryStore::new();
        let session = store
            .replace_otp_session(new_session("doc@x.com", Utc::now()))
            .await
            .unwrap();

        assert!(store.consume_otp_session(session.id).await.unwrap());
        assert!(!store.consume_otp_session(session.id).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_keeps_a_single_doctor_per_email() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let first = store.upsert_doctor("doc@x.com", now).await.unwrap();
        let later = now + Duration::minutes(1);
        let second = store.upsert_doctor("doc@x.com", later).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, now);
        assert_eq!(second.updated_at, later);
    }

    #[tokio::test]
    async fn pin_hash_is_written_only_once() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let doctor = store.upsert_doctor("doc@x.com", now).await.unwrap();

        assert!(store.set_pin_hash_once(doctor.id, "first", now).await.unwrap());
        assert!(!store.set_pin_hash_once(doctor.id, "second", now).await.unwrap());

        let stored = store.find_doctor(doctor.id).await.unwrap().unwrap();
        assert_eq!(stored.pin_hash.as_deref(), Some("first"));
        assert!(stored.pin_set);
    }

    #[tokio::test]
    async fn updating_a_missing_doctor_returns_none() {
        let store = MemoryStore::new();
        let update = UpdateDoctor {
            name: Some("Dr. Nobody".into()),
            ..Default::default()
        };
        assert!(store
            .update_doctor(Uuid::new_v4(), &update, Utc::now())
            .await
            .unwrap()
            .is_none());
    }
}
