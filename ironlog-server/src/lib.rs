//! HTTP surface of the workout log.
//!
//! [`app`] assembles the router. `/health` and `/login` are public; every
//! other route runs behind [`auth::require_auth`].

pub mod auth;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post};
use log::warn;
use tower_http::cors::CorsLayer;

pub use error::ApiError;
pub use state::AppState;

use routes::{health, login, sessions, sets, workouts};

fn cors_layer(allowed_origin: &str) -> Option<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)
        .inspect_err(|e| warn!("Ignoring invalid ALLOWED_ORIGIN {:?}: {}", allowed_origin, e))
        .ok()?;

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(300)),
    )
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/workouts", post(workouts::create_workout))
        .route("/workouts/{session_id}", get(workouts::list_workouts))
        .route("/sets", post(sets::create_set))
        .route("/sets/{workout_id}", get(sets::list_sets))
        .route("/lastworkout/{workout_name}", get(workouts::last_workout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/login", post(login::login))
        .merge(protected)
        .layer(middleware::from_fn(logging::log_requests));

    if let Some(cors) = state
        .config
        .allowed_origin
        .as_deref()
        .and_then(cors_layer)
    {
        router = router.layer(cors);
    }

    router.with_state(state)
}
