//! VitalFlow doctor authentication: email OTP login, bearer tokens and the
//! prescription signing PIN.

pub mod config;
pub mod database;
pub mod dtos;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use errors::{AppError, Result};
pub use routes::build_router;
pub use state::AppState;
