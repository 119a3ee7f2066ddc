//! HTTP DTOs for lamp endpoints.
//!
//! Field names follow the public API contract (camelCase, RFC3339
//! timestamps), decoupled from the domain types.

use serde::{Deserialize, Serialize};

use crate::application::LampPageResult;
use crate::domain::lamp::Lamp;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a new lamp.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLampRequest {
    pub status: bool,
}

/// Request to update a lamp's status.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLampRequest {
    pub status: bool,
}

/// Query parameters for listing lamps.
///
/// The cursor is opaque to callers; a missing or unparsable cursor reads
/// from the beginning rather than erroring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListLampsQuery {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<u64>,
}

impl ListLampsQuery {
    /// Decodes the cursor into a starting offset, degrading to 0.
    pub fn offset(&self) -> u64 {
        self.cursor
            .as_deref()
            .and_then(|c| c.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// A lamp as exposed by the API.
#[derive(Debug, Clone, Serialize)]
pub struct LampResponse {
    pub id: String,
    pub status: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<&Lamp> for LampResponse {
    fn from(lamp: &Lamp) -> Self {
        Self {
            id: lamp.id().to_string(),
            status: lamp.status(),
            created_at: lamp.created_at().as_datetime().to_rfc3339(),
            updated_at: lamp.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Paginated list of lamps.
#[derive(Debug, Clone, Serialize)]
pub struct ListLampsResponse {
    pub data: Vec<LampResponse>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl From<LampPageResult> for ListLampsResponse {
    fn from(page: LampPageResult) -> Self {
        Self {
            data: page.items.iter().map(LampResponse::from).collect(),
            has_more: page.has_more,
            next_cursor: page.next_cursor,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("Lamp not found: {}", id),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_lamp_request_deserializes() {
        let req: CreateLampRequest = serde_json::from_str(r#"{"status": true}"#).unwrap();
        assert!(req.status);
    }

    #[test]
    fn lamp_response_uses_camel_case_keys() {
        let lamp = Lamp::new(true);
        let json = serde_json::to_value(LampResponse::from(&lamp)).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["status"], serde_json::json!(true));
        assert_eq!(json["id"], serde_json::json!(lamp.id().to_string()));
    }

    #[test]
    fn next_cursor_is_omitted_when_absent() {
        let response = ListLampsResponse {
            data: vec![],
            has_more: false,
            next_cursor: None,
        };
        let json = serde_json::to_value(response).unwrap();
        assert!(json.get("nextCursor").is_none());
        assert_eq!(json["hasMore"], serde_json::json!(false));
    }

    #[test]
    fn cursor_decodes_to_offset() {
        let query = ListLampsQuery {
            cursor: Some("25".to_string()),
            page_size: None,
        };
        assert_eq!(query.offset(), 25);
    }

    #[test]
    fn missing_or_garbage_cursor_degrades_to_zero() {
        assert_eq!(ListLampsQuery::default().offset(), 0);

        let garbage = ListLampsQuery {
            cursor: Some("not-a-number".to_string()),
            page_size: None,
        };
        assert_eq!(garbage.offset(), 0);

        let negative = ListLampsQuery {
            cursor: Some("-5".to_string()),
            page_size: None,
        };
        assert_eq!(negative.offset(), 0);
    }

    #[test]
    fn error_response_not_found_includes_id() {
        let error = ErrorResponse::not_found("abc-123");
        assert_eq!(error.code, "NOT_FOUND");
        assert!(error.message.contains("abc-123"));
    }
}
