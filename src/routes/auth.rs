use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers::auth, middleware::auth::auth_middleware, state::AppState};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Request a login OTP by email
        .route("/login", post(auth::login))
        // Exchange the OTP for an access token
        .route("/verify", post(auth::verify))
        .merge(protected)
}
