//! LampService - business logic for lamp CRUD and pagination.
//!
//! Sits between the HTTP adapter and the repository port. Owns the
//! offset-cursor pagination math and the soft-delete policy: the service
//! never hard-deletes; rows leave the store only through the test-only
//! `delete_all`.

use std::sync::Arc;

use crate::domain::foundation::{LampId, Timestamp};
use crate::domain::lamp::{Lamp, LampError};
use crate::ports::LampRepository;

/// Page size applied when the caller requests none (or a non-positive
/// value).
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// One page of active lamps with cursor metadata.
///
/// The cursor is caller-opaque: the string form of the next offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LampPageResult {
    pub items: Vec<Lamp>,
    pub total: u64,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Service layer for lamp operations.
pub struct LampService {
    repository: Arc<dyn LampRepository>,
}

impl LampService {
    pub fn new(repository: Arc<dyn LampRepository>) -> Self {
        Self { repository }
    }

    /// Create a new lamp with the given status.
    pub async fn create(&self, status: bool) -> Result<Lamp, LampError> {
        let lamp = Lamp::new(status);
        Ok(self.repository.save(&lamp).await?)
    }

    /// Find an active lamp by id. `None` for unknown or soft-deleted ids.
    pub async fn find_by_id(&self, id: &LampId) -> Result<Option<Lamp>, LampError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// All active lamps ordered by `(created_at, id)` ascending.
    pub async fn find_all_active(&self) -> Result<Vec<Lamp>, LampError> {
        Ok(self.repository.find_all_active().await?)
    }

    /// Active lamps with an exact status match.
    pub async fn find_by_status(&self, is_on: bool) -> Result<Vec<Lamp>, LampError> {
        Ok(self.repository.find_by_status(is_on).await?)
    }

    /// Count of active lamps.
    pub async fn count_active(&self) -> Result<u64, LampError> {
        Ok(self.repository.count_active().await?)
    }

    /// One page of active lamps starting at `offset`.
    ///
    /// `page_size` falls back to [`DEFAULT_PAGE_SIZE`] unless positive.
    /// `next_cursor` is the string form of `offset + returned` and is
    /// present only when more records follow.
    pub async fn find_all_active_page(
        &self,
        offset: u64,
        page_size: Option<u64>,
    ) -> Result<LampPageResult, LampError> {
        let limit = page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);

        let page = self.repository.find_page(offset, limit).await?;
        let returned = page.items.len() as u64;
        let has_more = offset + returned < page.total;
        let next_cursor = has_more.then(|| (offset + returned).to_string());

        Ok(LampPageResult {
            items: page.items,
            total: page.total,
            has_more,
            next_cursor,
        })
    }

    /// Apply a new status to an active lamp.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no active lamp matches; nothing is written.
    pub async fn update(&self, id: &LampId, status: bool) -> Result<Lamp, LampError> {
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(LampError::NotFound(*id))?;

        Ok(self.repository.save(&existing.with_status(status)).await?)
    }

    /// Soft-delete an active lamp: sets `deleted_at`, keeps the row.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no active lamp matches (including lamps already
    ///   soft-deleted).
    pub async fn delete(&self, id: &LampId) -> Result<(), LampError> {
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(LampError::NotFound(*id))?;

        self.repository
            .save(&existing.soft_deleted(Timestamp::now()))
            .await?;
        Ok(())
    }

    /// Hard-clears the store. Test isolation only; never wired to an
    /// HTTP endpoint.
    pub async fn delete_all(&self) -> Result<(), LampError> {
        Ok(self.repository.delete_all().await?)
    }
}
