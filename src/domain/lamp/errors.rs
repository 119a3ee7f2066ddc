//! Lamp-specific error types.

use crate::domain::foundation::{DomainError, LampId};

/// Lamp-specific errors surfaced by the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LampError {
    /// No active lamp matches the id.
    NotFound(LampId),
    /// The supplied id is not a valid UUID.
    InvalidId(String),
    /// Infrastructure error (database, configuration).
    Infrastructure(String),
}

impl LampError {
    pub fn not_found(id: LampId) -> Self {
        LampError::NotFound(id)
    }

    pub fn invalid_id(raw: impl Into<String>) -> Self {
        LampError::InvalidId(raw.into())
    }
}

impl std::fmt::Display for LampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LampError::NotFound(id) => write!(f, "Lamp not found: {}", id),
            LampError::InvalidId(raw) => write!(f, "Invalid lamp id: {}", raw),
            LampError::Infrastructure(msg) => write!(f, "Infrastructure error: {}", msg),
        }
    }
}

impl std::error::Error for LampError {}

impl From<DomainError> for LampError {
    /// Repository failures reach the service as infrastructure errors.
    /// Not-found conditions are detected by the service from `Option`
    /// results, so they never travel this path.
    fn from(err: DomainError) -> Self {
        LampError::Infrastructure(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_id() {
        let id = LampId::new();
        let err = LampError::not_found(id);
        assert!(format!("{}", err).contains(&id.to_string()));
    }

    #[test]
    fn domain_error_converts_to_infrastructure() {
        let err: LampError = DomainError::database("connection reset").into();
        assert!(matches!(err, LampError::Infrastructure(_)));
    }
}
