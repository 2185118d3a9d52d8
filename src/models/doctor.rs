use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub registration_no: Option<String>,
    pub specialization: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub clinic_logo_url: Option<String>,
    pub abha_id: Option<String>,
    pub pin_hash: Option<String>,
    pub pin_set: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// A fresh credential row as created by the first successful login.
    pub fn new(email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            phone: None,
            registration_no: None,
            specialization: None,
            clinic_name: None,
            clinic_address: None,
            clinic_logo_url: None,
            abha_id: None,
            pin_hash: None,
            pin_set: false,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_pin(&self) -> bool {
        self.pin_set && self.pin_hash.is_some()
    }

    pub fn apply(&mut self, update: &UpdateDoctor, now: DateTime<Utc>) {
        fn merge(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        merge(&mut self.name, &update.name);
        merge(&mut self.phone, &update.phone);
        merge(&mut self.registration_no, &update.registration_no);
        merge(&mut self.specialization, &update.specialization);
        merge(&mut self.clinic_name, &update.clinic_name);
        merge(&mut self.clinic_address, &update.clinic_address);
        merge(&mut self.clinic_logo_url, &update.clinic_logo_url);
        merge(&mut self.abha_id, &update.abha_id);
        self.updated_at = now;
    }
}

/// Profile fields a doctor may change. Security fields (`email`, PIN,
/// verification flag) are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDoctor {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub registration_no: Option<String>,
    pub specialization: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub clinic_logo_url: Option<String>,
    pub abha_id: Option<String>,
}

impl UpdateDoctor {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.registration_no.is_none()
            && self.specialization.is_none()
            && self.clinic_name.is_none()
            && self.clinic_address.is_none()
            && self.clinic_logo_url.is_none()
            && self.abha_id.is_none()
    }
}

/// What clients get to see of a doctor record.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub registration_no: Option<String>,
    pub specialization: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub clinic_logo_url: Option<String>,
    pub abha_id: Option<String>,
    pub pin_set: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Doctor> for DoctorProfile {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            phone: doctor.phone,
            registration_no: doctor.registration_no,
            specialization: doctor.specialization,
            clinic_name: doctor.clinic_name,
            clinic_address: doctor.clinic_address,
            clinic_logo_url: doctor.clinic_logo_url,
            abha_id: doctor.abha_id,
            pin_set: doctor.pin_set,
            is_verified: doctor.is_verified,
            created_at: doctor.created_at,
            updated_at: doctor.updated_at,
        }
    }
}

/// Bearer token payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn doctor_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}
