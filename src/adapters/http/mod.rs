//! HTTP adapter - axum routes, handlers, and DTOs.

pub mod lamps;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::application::LampService;
use std::sync::Arc;

/// Builds the full application router.
pub fn app_router(service: Arc<LampService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/lamps", lamps::lamp_routes(service))
}

/// GET /health - liveness probe.
async fn health() -> StatusCode {
    StatusCode::OK
}
