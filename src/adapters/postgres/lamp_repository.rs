//! PostgreSQL implementation of LampRepository.
//!
//! Every query states its soft-delete predicate (`deleted_at IS NULL`)
//! explicitly so the backend matches the in-memory implementation
//! exactly. Ordered reads sort by `(created_at, id)` for deterministic
//! pagination when creation timestamps collide.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, LampId, Timestamp};
use crate::domain::lamp::Lamp;
use crate::ports::{LampPage, LampRepository};

/// PostgreSQL implementation of LampRepository.
#[derive(Clone)]
pub struct PostgresLampRepository {
    pool: PgPool,
}

impl PostgresLampRepository {
    /// Creates a new PostgresLampRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LampRepository for PostgresLampRepository {
    async fn save(&self, lamp: &Lamp) -> Result<Lamp, DomainError> {
        // Upsert keyed by id: preserve created_at, refresh updated_at.
        let row = sqlx::query(
            r#"
            INSERT INTO lamps (id, status, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, NOW(), $4)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                updated_at = NOW(),
                deleted_at = EXCLUDED.deleted_at
            RETURNING id, status, created_at, updated_at, deleted_at
            "#,
        )
        .bind(lamp.id().as_uuid())
        .bind(lamp.status())
        .bind(lamp.created_at().as_datetime())
        .bind(lamp.deleted_at().map(|t| *t.as_datetime()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save lamp: {}", e)))?;

        row_to_lamp(row)
    }

    async fn find_by_id(&self, id: &LampId) -> Result<Option<Lamp>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, status, created_at, updated_at, deleted_at
            FROM lamps
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lamp: {}", e)))?;

        row.map(row_to_lamp).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Lamp>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, status, created_at, updated_at, deleted_at
            FROM lamps
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lamps: {}", e)))?;

        rows.into_iter().map(row_to_lamp).collect()
    }

    async fn find_page(&self, offset: u64, limit: u64) -> Result<LampPage, DomainError> {
        let (offset, limit) = page_bounds(offset, limit);
        let rows = sqlx::query(
            r#"
            SELECT id, status, created_at, updated_at, deleted_at
            FROM lamps
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lamp page: {}", e)))?;

        let items: Result<Vec<Lamp>, DomainError> = rows.into_iter().map(row_to_lamp).collect();
        let total = self.count_active().await?;

        Ok(LampPage {
            items: items?,
            total,
        })
    }

    async fn find_by_status(&self, is_on: bool) -> Result<Vec<Lamp>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, status, created_at, updated_at, deleted_at
            FROM lamps
            WHERE status = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(is_on)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lamps by status: {}", e)))?;

        rows.into_iter().map(row_to_lamp).collect()
    }

    async fn find_all_active(&self) -> Result<Vec<Lamp>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, status, created_at, updated_at, deleted_at
            FROM lamps
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch active lamps: {}", e)))?;

        rows.into_iter().map(row_to_lamp).collect()
    }

    async fn count_active(&self) -> Result<u64, DomainError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM lamps WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::database(format!("Failed to count active lamps: {}", e))
                })?;

        Ok(result.0 as u64)
    }

    async fn exists_by_id(&self, id: &LampId) -> Result<bool, DomainError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM lamps WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to check lamp existence: {}", e)))?;

        Ok(result.0 > 0)
    }

    async fn delete_by_id(&self, id: &LampId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM lamps WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete lamp: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::lamp_not_found(id));
        }

        Ok(())
    }

    async fn delete_all(&self) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM lamps")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to clear lamps: {}", e)))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lamps")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to count lamps: {}", e)))?;

        Ok(result.0 as u64)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Cursor offsets arrive as `u64` but Postgres binds `i64`. Values past
/// `i64::MAX` clamp instead of wrapping negative, so an oversized offset
/// reads past the end of the table and yields an empty page.
fn page_bounds(offset: u64, limit: u64) -> (i64, i64) {
    (
        i64::try_from(offset).unwrap_or(i64::MAX),
        i64::try_from(limit).unwrap_or(i64::MAX),
    )
}

fn row_to_lamp(row: sqlx::postgres::PgRow) -> Result<Lamp, DomainError> {
    let id: uuid::Uuid = row
        .try_get("id")
        .map_err(|e| DomainError::database(format!("Failed to get id: {}", e)))?;

    let status: bool = row
        .try_get("status")
        .map_err(|e| DomainError::database(format!("Failed to get status: {}", e)))?;

    let created_at: chrono::DateTime<chrono::Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::database(format!("Failed to get created_at: {}", e)))?;

    let updated_at: chrono::DateTime<chrono::Utc> = row
        .try_get("updated_at")
        .map_err(|e| DomainError::database(format!("Failed to get updated_at: {}", e)))?;

    let deleted_at: Option<chrono::DateTime<chrono::Utc>> = row
        .try_get("deleted_at")
        .map_err(|e| DomainError::database(format!("Failed to get deleted_at: {}", e)))?;

    Ok(Lamp::reconstitute(
        LampId::from_uuid(id),
        status,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        deleted_at.map(Timestamp::from_datetime),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_pass_ordinary_values_through() {
        assert_eq!(page_bounds(0, 25), (0, 25));
        assert_eq!(page_bounds(10_000, 100), (10_000, 100));
    }

    #[test]
    fn page_bounds_clamp_values_beyond_i64() {
        assert_eq!(page_bounds(u64::MAX, 25), (i64::MAX, 25));
        assert_eq!(page_bounds(10_000_000_000_000_000_000, u64::MAX), (i64::MAX, i64::MAX));
    }
}
