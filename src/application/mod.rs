//! Application layer - orchestrates domain operations over the ports.

mod lamp_service;

pub use lamp_service::{LampPageResult, LampService, DEFAULT_PAGE_SIZE};
