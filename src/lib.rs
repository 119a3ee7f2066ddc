//! Lamp Control - CRUD REST API for lamp devices.
//!
//! Exposes a `/lamps` resource backed by either a thread-safe in-memory
//! store or PostgreSQL, selected once at startup from configuration.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
