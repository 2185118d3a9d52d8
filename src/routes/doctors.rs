use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers::doctors, middleware::auth::auth_middleware, state::AppState};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/pin/set", post(doctors::set_pin))
        .route("/pin/verify", post(doctors::verify_pin))
        .route("/:id", get(doctors::get_doctor).put(doctors::update_doctor))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
