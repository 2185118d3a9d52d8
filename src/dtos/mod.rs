pub mod auth_dtos;
pub mod doctor_dtos;
