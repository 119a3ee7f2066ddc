//! Lamp entity.
//!
//! A lamp is an on/off device with server-generated identity and
//! lifecycle timestamps. Deletion is soft: `deleted_at` marks a record
//! invisible to default reads without removing the row.
//!
//! # Invariants
//!
//! - `id` is globally unique and immutable after creation
//! - `created_at <= updated_at` always
//! - a non-None `deleted_at` excludes the lamp from every default query

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LampId, Timestamp};

/// Lamp entity - the sole resource of this API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lamp {
    /// Unique identifier, generated on creation.
    id: LampId,

    /// On/off status.
    status: bool,

    /// When the lamp was created. Never modified afterward.
    created_at: Timestamp,

    /// When the lamp was last written, including soft deletes.
    updated_at: Timestamp,

    /// Soft-delete marker. `Some` means the record is invisible to
    /// default reads.
    deleted_at: Option<Timestamp>,
}

impl Lamp {
    /// Create a new active lamp with a fresh id and current timestamps.
    pub fn new(status: bool) -> Self {
        let now = Timestamp::now();
        Self {
            id: LampId::new(),
            status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Reconstitute a lamp from persistence (no validation).
    pub fn reconstitute(
        id: LampId,
        status: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
        deleted_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            status,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the lamp id.
    pub fn id(&self) -> &LampId {
        &self.id
    }

    /// Returns the on/off status.
    pub fn status(&self) -> bool {
        self.status
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the last-write timestamp.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns the soft-delete timestamp, if any.
    pub fn deleted_at(&self) -> Option<&Timestamp> {
        self.deleted_at.as_ref()
    }

    /// True when the lamp has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns a copy with the new status applied.
    ///
    /// `updated_at` is refreshed by the repository on save, not here, so
    /// that both backends stamp write times identically.
    pub fn with_status(&self, status: bool) -> Self {
        let mut lamp = self.clone();
        lamp.status = status;
        lamp
    }

    /// Returns a copy marked as soft-deleted at the given moment.
    pub fn soft_deleted(&self, at: Timestamp) -> Self {
        let mut lamp = self.clone();
        lamp.deleted_at = Some(at);
        lamp
    }
}
