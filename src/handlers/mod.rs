use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::doctor::Claims;

pub mod auth;
pub mod doctors;
pub mod health;

/// Doctor id carried by a verified token.
pub(crate) fn authenticated_doctor(claims: &Claims) -> Result<Uuid> {
    claims.doctor_id().ok_or(AppError::Unauthorized)
}
