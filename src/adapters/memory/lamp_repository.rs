//! In-memory implementation of LampRepository.
//!
//! Stores lamps in a lock-guarded map keyed by id. Safe for concurrent
//! callers; used when no database URL is configured, and for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, LampId, Timestamp};
use crate::domain::lamp::Lamp;
use crate::ports::{LampPage, LampRepository};

/// In-memory LampRepository backed by a shared map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLampRepository {
    lamps: Arc<RwLock<HashMap<Uuid, Lamp>>>,
}

impl InMemoryLampRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            lamps: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// True when no lamps are stored, soft-deleted included.
    pub async fn is_empty(&self) -> bool {
        self.lamps.read().await.is_empty()
    }

    /// Active lamps sorted by `(created_at, id)` ascending.
    async fn active_sorted(&self) -> Vec<Lamp> {
        let lamps = self.lamps.read().await;
        let mut active: Vec<Lamp> = lamps.values().filter(|l| l.is_active()).cloned().collect();
        active.sort_by(|a, b| {
            a.created_at()
                .cmp(b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        active
    }
}

#[async_trait]
impl LampRepository for InMemoryLampRepository {
    async fn save(&self, lamp: &Lamp) -> Result<Lamp, DomainError> {
        let mut lamps = self.lamps.write().await;
        let now = Timestamp::now();

        // Preserve created_at on updates, always refresh updated_at.
        let created_at = match lamps.get(lamp.id().as_uuid()) {
            Some(existing) => *existing.created_at(),
            None => *lamp.created_at(),
        };

        let stored = Lamp::reconstitute(
            *lamp.id(),
            lamp.status(),
            created_at,
            now,
            lamp.deleted_at().copied(),
        );

        lamps.insert(*stored.id().as_uuid(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &LampId) -> Result<Option<Lamp>, DomainError> {
        let lamps = self.lamps.read().await;
        Ok(lamps.get(id.as_uuid()).filter(|l| l.is_active()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Lamp>, DomainError> {
        let lamps = self.lamps.read().await;
        Ok(lamps.values().filter(|l| l.is_active()).cloned().collect())
    }

    async fn find_page(&self, offset: u64, limit: u64) -> Result<LampPage, DomainError> {
        let active = self.active_sorted().await;
        let total = active.len() as u64;

        let start = offset.min(total) as usize;
        let end = offset.saturating_add(limit).min(total) as usize;

        Ok(LampPage {
            items: active[start..end].to_vec(),
            total,
        })
    }

    async fn find_by_status(&self, is_on: bool) -> Result<Vec<Lamp>, DomainError> {
        let lamps = self.lamps.read().await;
        Ok(lamps
            .values()
            .filter(|l| l.is_active() && l.status() == is_on)
            .cloned()
            .collect())
    }

    async fn find_all_active(&self) -> Result<Vec<Lamp>, DomainError> {
        Ok(self.active_sorted().await)
    }

    async fn count_active(&self) -> Result<u64, DomainError> {
        let lamps = self.lamps.read().await;
        Ok(lamps.values().filter(|l| l.is_active()).count() as u64)
    }

    async fn exists_by_id(&self, id: &LampId) -> Result<bool, DomainError> {
        let lamps = self.lamps.read().await;
        Ok(lamps.get(id.as_uuid()).is_some_and(|l| l.is_active()))
    }

    async fn delete_by_id(&self, id: &LampId) -> Result<(), DomainError> {
        let mut lamps = self.lamps.write().await;
        if lamps.remove(id.as_uuid()).is_none() {
            return Err(DomainError::lamp_not_found(id));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), DomainError> {
        self.lamps.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.lamps.read().await.len() as u64)
    }
}
