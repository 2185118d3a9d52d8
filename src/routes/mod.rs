use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers::health, state::AppState};

pub mod auth;
pub mod doctors;

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/auth", auth::routes(app_state.clone()))
        .nest("/api/doctors", doctors::routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
