use axum::{
    extract::State,
    response::Json,
    Extension,
};
use validator::Validate;

use crate::dtos::auth_dtos::{AccessTokenResponse, LoginRequest, MessageResponse, VerifyOtpRequest};
use crate::errors::Result;
use crate::extract::AppJson;
use crate::handlers::authenticated_doctor;
use crate::models::doctor::{Claims, DoctorProfile};
use crate::state::AppState;

// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<MessageResponse>> {
    payload.validate()?;

    state.otp_service.request_challenge(&payload.email).await?;

    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

// POST /api/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyOtpRequest>,
) -> Result<Json<AccessTokenResponse>> {
    payload.validate()?;

    let login = state
        .otp_service
        .verify(&payload.email, &payload.otp)
        .await?;

    Ok(Json(AccessTokenResponse {
        access_token: login.access_token,
    }))
}

// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DoctorProfile>> {
    let doctor_id = authenticated_doctor(&claims)?;
    let profile = state.doctor_service.profile(doctor_id).await?;
    Ok(Json(profile))
}
