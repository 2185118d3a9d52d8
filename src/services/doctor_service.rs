use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::CredentialStore;
use crate::errors::{AppError, Result};
use crate::models::doctor::{DoctorProfile, UpdateDoctor};

#[derive(Clone)]
pub struct DoctorService {
    store: Arc<dyn CredentialStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn profile(&self, doctor_id: Uuid) -> Result<DoctorProfile> {
        self.store
            .find_doctor(doctor_id)
            .await?
            .map(DoctorProfile::from)
            .ok_or(AppError::NotFound("Doctor"))
    }

    /// Only the doctor named in the token may edit their own profile.
    pub async fn update_profile(
        &self,
        requester_id: Uuid,
        doctor_id: Uuid,
        update: UpdateDoctor,
    ) -> Result<DoctorProfile> {
        if requester_id != doctor_id {
            return Err(AppError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }

        if update.is_empty() {
            return Err(AppError::invalid_input("No valid fields provided for update"));
        }

        let doctor = self
            .store
            .update_doctor(doctor_id, &update, Utc::now())
            .await?
            .ok_or(AppError::NotFound("Doctor"))?;

        tracing::info!(doctor_id = %doctor_id, "doctor profile updated");
        Ok(doctor.into())
    }
}
