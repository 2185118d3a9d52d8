use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::auth_dtos::MessageResponse;
use crate::dtos::doctor_dtos::{PinRequest, UpdateDoctorRequest};
use crate::errors::{AppError, Result};
use crate::extract::AppJson;
use crate::handlers::authenticated_doctor;
use crate::models::doctor::{Claims, DoctorProfile};
use crate::services::pin_service::PinVerification;
use crate::state::AppState;

fn parse_doctor_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_input("Invalid doctor ID"))
}

// GET /api/doctors/:id
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DoctorProfile>> {
    let doctor_id = parse_doctor_id(&id)?;
    Ok(Json(state.doctor_service.profile(doctor_id).await?))
}

// PUT /api/doctors/:id
pub async fn update_doctor(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateDoctorRequest>,
) -> Result<Json<DoctorProfile>> {
    let requester_id = authenticated_doctor(&claims)?;
    let doctor_id = parse_doctor_id(&id)?;
    payload.validate()?;

    let profile = state
        .doctor_service
        .update_profile(requester_id, doctor_id, payload.into())
        .await?;

    Ok(Json(profile))
}

// POST /api/doctors/pin/set
pub async fn set_pin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<PinRequest>,
) -> Result<Json<MessageResponse>> {
    payload.validate()?;
    let doctor_id = authenticated_doctor(&claims)?;

    state.pin_service.set_pin(doctor_id, &payload.pin).await?;

    Ok(Json(MessageResponse::new("PIN set successfully")))
}

// POST /api/doctors/pin/verify
pub async fn verify_pin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<PinRequest>,
) -> Result<Json<PinVerification>> {
    payload.validate()?;
    let doctor_id = authenticated_doctor(&claims)?;

    Ok(Json(state.pin_service.verify_pin(doctor_id, &payload.pin).await?))
}
