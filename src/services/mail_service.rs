use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::EmailConfig;
use crate::errors::{AppError, Result};

/// Out-of-band delivery of a plaintext OTP.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_otp(&self, email: &str, otp: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
    text: String,
}

/// Sends OTP emails through a Resend-compatible JSON API.
#[derive(Clone)]
pub struct MailService {
    config: EmailConfig,
    client: Client,
}

impl MailService {
    pub fn new(config: EmailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl OtpNotifier for MailService {
    async fn send_otp(&self, email: &str, otp: &str) -> Result<()> {
        let payload = EmailPayload {
            from: &self.config.sender,
            to: [email],
            subject: "Your VitalsFlow Login OTP",
            html: otp_email_html(otp),
            text: format!(
                "Your VitalsFlow login OTP is {}. It is valid for 5 minutes. \
                 If you did not request this, please ignore this email.",
                otp
            ),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!(recipient = %email, "OTP email sent");
            Ok(())
        } else {
            Err(AppError::delivery(format!(
                "Email API responded with status: {}",
                response.status()
            )))
        }
    }
}

fn otp_email_html(otp: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #2563eb;">VitalsFlow</h1>
  <h2>Doctor Authentication</h2>
  <p>Use the following OTP to log in to your VitalsFlow account. This OTP is valid for 5 minutes.</p>
  <p style="font-size: 32px; font-weight: bold; letter-spacing: 5px; color: #2563eb;">{}</p>
  <p style="font-size: 14px; color: #64748b;">If you did not request this, please ignore this email.</p>
</div>"#,
        otp
    )
}

/// Development notifier: writes the OTP to the log instead of mailing it.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn send_otp(&self, email: &str, otp: &str) -> Result<()> {
        tracing::warn!(recipient = %email, otp = %otp, "email delivery disabled, OTP logged instead");
        Ok(())
    }
}
