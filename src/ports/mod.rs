//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.

mod lamp_repository;

pub use lamp_repository::{LampPage, LampRepository};
