use serde::Deserialize;
use validator::Validate;

use crate::models::doctor::UpdateDoctor;

#[derive(Debug, Deserialize, Validate)]
pub struct PinRequest {
    #[validate(length(min = 4, max = 6, message = "PIN must be a numeric string of 4-6 digits"))]
    pub pin: String,
}

/// Unknown keys are ignored, which is how `email`, `pin_hash` or
/// `is_verified` in a request body are kept out of the update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDoctorRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub registration_no: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub specialization: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub clinic_name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub clinic_address: Option<String>,
    #[validate(url)]
    pub clinic_logo_url: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub abha_id: Option<String>,
}

impl From<UpdateDoctorRequest> for UpdateDoctor {
    fn from(req: UpdateDoctorRequest) -> Self {
        UpdateDoctor {
            name: req.name,
            phone: req.phone,
            registration_no: req.registration_no,
            specialization: req.specialization,
            clinic_name: req.clinic_name,
            clinic_address: req.clinic_address,
            clinic_logo_url: req.clinic_logo_url,
            abha_id: req.abha_id,
        }
    }
}
