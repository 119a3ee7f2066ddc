//! Lamp entity and lamp-specific errors.

mod entity;
mod errors;

pub use entity::Lamp;
pub use errors::LampError;
