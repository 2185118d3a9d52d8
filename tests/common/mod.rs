#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration;
use std::sync::{Arc, Mutex};

use vitalflow_api::config::AuthConfig;
use vitalflow_api::database::{CredentialStore, MemoryStore};
use vitalflow_api::services::mail_service::OtpNotifier;
use vitalflow_api::{AppError, AppState, Result};

pub const TEST_SECRET: &str = "vitalflow-test-secret";

pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.into(),
        token_ttl: Duration::hours(1),
        otp_ttl: Duration::minutes(5),
        max_otp_attempts: 3,
        bcrypt_cost: 4,
    }
}

/// Captures every OTP instead of mailing it.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn last_code_for(&self, email: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
            .expect("no OTP was sent to this address")
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn send_otp(&self, email: &str, otp: &str) -> Result<()> {
        self.sent.lock().unwrap().push((email.to_string(), otp.to_string()));
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl OtpNotifier for FailingNotifier {
    async fn send_otp(&self, _email: &str, _otp: &str) -> Result<()> {
        Err(AppError::delivery("mailbox unavailable"))
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub notifier: RecordingNotifier,
    pub state: AppState,
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(config: AuthConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifier = RecordingNotifier::default();
    let state = AppState::new(
        store.clone() as Arc<dyn CredentialStore>,
        Arc::new(notifier.clone()),
        config,
    );

    Harness {
        store,
        notifier,
        state,
    }
}

/// Any six-digit code other than `code`.
pub fn wrong_code(code: &str) -> String {
    if code == "111111" {
        "222222".to_string()
    } else {
        "111111".to_string()
    }
}
