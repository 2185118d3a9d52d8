use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Require `Authorization: Bearer <jwt>` and expose its [`Claims`] to the
/// handler through request extensions.
///
/// [`Claims`]: crate::models::doctor::Claims
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = state.token_service.decode(token)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
