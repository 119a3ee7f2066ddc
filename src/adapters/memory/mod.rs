//! In-memory storage adapter.

mod lamp_repository;

pub use lamp_repository::InMemoryLampRepository;
