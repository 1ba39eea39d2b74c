use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use netscope_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the read-only query router. GET is the only allowed method; the
/// event store has no write surface over HTTP.
pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let allowed_origin = HeaderValue::from_str(frontend_url)
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE]);

    let router = Router::new()
        .route("/api/health", get(handlers::health::health_handler))
        .route("/api/events", get(handlers::events::list_events_handler))
        .route(
            "/api/events/{event_id}",
            get(handlers::events::get_event_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(router)
}
