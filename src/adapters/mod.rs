//! Adapters - implementations of port interfaces.
//!
//! - `memory` - in-memory repository (no database URL configured, tests)
//! - `postgres` - persistent repository over sqlx
//! - `selector` - startup-time backend choice
//! - `http` - axum routes, handlers, and DTOs

pub mod http;
pub mod memory;
pub mod postgres;
pub mod selector;

pub use selector::{select_lamp_repository, BackendKind};
