use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejections (missing fields, wrong types, no JSON
/// content type) come back as `AppError::InvalidInput`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
