//! HTTP routes for lamp endpoints.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::application::LampService;

use super::handlers::{create_lamp, delete_lamp, get_lamp, list_lamps, update_lamp};

/// Creates the lamp router with all endpoints.
pub fn lamp_routes(service: Arc<LampService>) -> Router {
    Router::new()
        .route("/", get(list_lamps).post(create_lamp))
        .route(
            "/:id",
            get(get_lamp).put(update_lamp).delete(delete_lamp),
        )
        .with_state(service)
}
