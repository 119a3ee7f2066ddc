//! HTTP handlers for lamp endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::LampService;
use crate::domain::foundation::LampId;
use crate::domain::lamp::LampError;

use super::dto::{
    CreateLampRequest, ErrorResponse, LampResponse, ListLampsQuery, ListLampsResponse,
    UpdateLampRequest,
};

/// GET /lamps - list active lamps with cursor pagination.
pub async fn list_lamps(
    State(service): State<Arc<LampService>>,
    Query(query): Query<ListLampsQuery>,
) -> Response {
    match service
        .find_all_active_page(query.offset(), query.page_size)
        .await
    {
        Ok(page) => {
            let response: ListLampsResponse = page.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_lamp_error(e),
    }
}

/// POST /lamps - create a new lamp.
pub async fn create_lamp(
    State(service): State<Arc<LampService>>,
    Json(req): Json<CreateLampRequest>,
) -> Response {
    match service.create(req.status).await {
        Ok(lamp) => (StatusCode::CREATED, Json(LampResponse::from(&lamp))).into_response(),
        Err(e) => handle_lamp_error(e),
    }
}

/// GET /lamps/:id - fetch a single lamp.
pub async fn get_lamp(
    State(service): State<Arc<LampService>>,
    Path(lamp_id): Path<String>,
) -> Response {
    let lamp_id = match parse_lamp_id(&lamp_id) {
        Ok(id) => id,
        Err(e) => return handle_lamp_error(e),
    };

    match service.find_by_id(&lamp_id).await {
        Ok(Some(lamp)) => (StatusCode::OK, Json(LampResponse::from(&lamp))).into_response(),
        Ok(None) => not_found(&lamp_id),
        Err(e) => handle_lamp_error(e),
    }
}

/// PUT /lamps/:id - update a lamp's status.
pub async fn update_lamp(
    State(service): State<Arc<LampService>>,
    Path(lamp_id): Path<String>,
    Json(req): Json<UpdateLampRequest>,
) -> Response {
    let lamp_id = match parse_lamp_id(&lamp_id) {
        Ok(id) => id,
        Err(e) => return handle_lamp_error(e),
    };

    match service.update(&lamp_id, req.status).await {
        Ok(lamp) => (StatusCode::OK, Json(LampResponse::from(&lamp))).into_response(),
        Err(e) => handle_lamp_error(e),
    }
}

/// DELETE /lamps/:id - soft-delete a lamp.
pub async fn delete_lamp(
    State(service): State<Arc<LampService>>,
    Path(lamp_id): Path<String>,
) -> Response {
    let lamp_id = match parse_lamp_id(&lamp_id) {
        Ok(id) => id,
        Err(e) => return handle_lamp_error(e),
    };

    match service.delete(&lamp_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_lamp_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_lamp_id(raw: &str) -> Result<LampId, LampError> {
    raw.parse::<LampId>()
        .map_err(|_| LampError::invalid_id(raw))
}

fn not_found(id: &LampId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found(&id.to_string())),
    )
        .into_response()
}

fn handle_lamp_error(error: LampError) -> Response {
    match error {
        LampError::NotFound(id) => not_found(&id),
        LampError::InvalidId(raw) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!(
                "Invalid lamp id: {}",
                raw
            ))),
        )
            .into_response(),
        LampError::Infrastructure(msg) => {
            tracing::error!(error = %msg, "lamp operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response()
        }
    }
}
