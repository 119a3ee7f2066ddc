//! Shared value objects and error types used across the domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::LampId;
pub use timestamp::Timestamp;
