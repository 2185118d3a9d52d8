// src/errors.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OTP expired or not found")]
    ChallengeNotFound,

    #[error("Too many failed attempts. Request a new OTP.")]
    TooManyAttempts,

    #[error("Invalid OTP")]
    InvalidCode,

    #[error("Invalid PIN")]
    InvalidPin,

    #[error("PIN already set. Use reset flow.")]
    PinAlreadySet,

    #[error("PIN has not been set yet. Please set a PIN first.")]
    PinNotSet,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Not authorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("OTP delivery failed: {0}")]
    DeliveryFailure(String),

    #[error("Store error: {0}")]
    StoreFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::PinAlreadySet | AppError::PinNotSet => {
                StatusCode::BAD_REQUEST
            }
            AppError::ChallengeNotFound
            | AppError::InvalidCode
            | AppError::InvalidPin
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AppError::DeliveryFailure(_)
            | AppError::StoreFailure(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the client. Upstream failures are
    /// collapsed into a generic text; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::DeliveryFailure(_) => "Failed to send OTP email".to_string(),
            AppError::StoreFailure(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        let error_label = status.canonical_reason().unwrap_or("Error");
        let body = Json(json!({
            "error": error_label,
            "message": self.public_message(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreFailure(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::DeliveryFailure(format!("HTTP request failed: {}", err))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("bcrypt: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {}", err))
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        AppError::DeliveryFailure(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        AppError::StoreFailure(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
