pub mod doctor_service;
pub mod hashing;
pub mod mail_service;
pub mod otp_service;
pub mod pin_service;
pub mod token_service;
pub mod validation;
