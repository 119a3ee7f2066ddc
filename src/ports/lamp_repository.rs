//! Lamp repository port.
//!
//! Defines the storage contract for lamps. Two interchangeable
//! implementations exist: an in-memory map and a PostgreSQL table.
//! Exactly one is selected at startup.
//!
//! # Soft-delete semantics
//!
//! Every default read path excludes soft-deleted records by an explicit
//! `deleted_at` check in the implementation, never by framework-injected
//! row filtering, so both backends behave identically.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LampId};
use crate::domain::lamp::Lamp;

/// One page of active lamps plus total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampPage {
    /// Lamps in this page, ordered by `(created_at, id)` ascending.
    pub items: Vec<Lamp>,
    /// Total number of active lamps in the store.
    pub total: u64,
}

/// Repository port for lamp persistence.
///
/// Implementations must:
/// - never mutate the caller's value on `save` (defensive copy)
/// - preserve `created_at` across updates and refresh `updated_at` on
///   every write
/// - exclude soft-deleted records from every default read path
#[async_trait]
pub trait LampRepository: Send + Sync {
    /// Insert when the id is unknown, update in place otherwise.
    ///
    /// Returns the stored copy with refreshed timestamps.
    async fn save(&self, lamp: &Lamp) -> Result<Lamp, DomainError>;

    /// Find an active lamp by id.
    ///
    /// Returns `None` for unknown or soft-deleted ids.
    async fn find_by_id(&self, id: &LampId) -> Result<Option<Lamp>, DomainError>;

    /// All active lamps, unordered.
    async fn find_all(&self) -> Result<Vec<Lamp>, DomainError>;

    /// One page of active lamps ordered by `(created_at, id)` ascending.
    ///
    /// An offset at or past the end yields an empty page with correct
    /// `total`, never an error.
    async fn find_page(&self, offset: u64, limit: u64) -> Result<LampPage, DomainError>;

    /// Active lamps with an exact status match.
    async fn find_by_status(&self, is_on: bool) -> Result<Vec<Lamp>, DomainError>;

    /// All active lamps ordered by `(created_at, id)` ascending.
    async fn find_all_active(&self) -> Result<Vec<Lamp>, DomainError>;

    /// Count of active lamps. Always equals `find_all_active().len()`.
    async fn count_active(&self) -> Result<u64, DomainError>;

    /// True when an active lamp with the id exists.
    async fn exists_by_id(&self, id: &LampId) -> Result<bool, DomainError>;

    /// Hard delete. Reserved for tests and administration; production
    /// deletion goes through the service's soft-delete path.
    ///
    /// # Errors
    ///
    /// - `LampNotFound` when no row matches the id
    async fn delete_by_id(&self, id: &LampId) -> Result<(), DomainError>;

    /// Hard-clears the entire store. Unsafe for production; intended for
    /// test isolation only.
    async fn delete_all(&self) -> Result<(), DomainError>;

    /// Raw record count, including soft-deleted rows.
    async fn count(&self) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn lamp_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LampRepository) {}
    }
}
