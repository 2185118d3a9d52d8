pub mod doctor;
pub mod otp;
