//! Storage backend selection.
//!
//! Exactly one repository backend is instantiated per process: Postgres
//! when a database URL resolves from configuration, the in-memory map
//! otherwise. The choice is static for the process lifetime; there is no
//! runtime fallback between backends.

use std::sync::Arc;

use crate::adapters::memory::InMemoryLampRepository;
use crate::adapters::postgres::{self, PostgresLampRepository};
use crate::config::{normalize_database_url, DatabaseConfig};
use crate::domain::foundation::DomainError;
use crate::ports::LampRepository;

/// Which backend was selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    InMemory,
    Postgres,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::InMemory => write!(f, "in-memory"),
            BackendKind::Postgres => write!(f, "postgres"),
        }
    }
}

/// Instantiates the repository backend for this process.
///
/// Connection or migration failures are returned to the caller and are
/// fatal at startup; nothing retries or falls back at runtime.
pub async fn select_lamp_repository(
    config: &DatabaseConfig,
) -> Result<(Arc<dyn LampRepository>, BackendKind), DomainError> {
    let Some(raw_url) = config.resolve_url() else {
        tracing::info!("no database URL configured, using in-memory repository");
        return Ok((Arc::new(InMemoryLampRepository::new()), BackendKind::InMemory));
    };

    let target = normalize_database_url(&raw_url).map_err(|e| {
        DomainError::new(
            crate::domain::foundation::ErrorCode::ConfigurationError,
            format!("Invalid database URL: {}", e),
        )
    })?;

    tracing::info!(
        unix_socket = target.unix_socket_path.as_deref().unwrap_or(""),
        cloud_sql_instance = target.cloud_sql_instance.as_deref().unwrap_or(""),
        lazy_refresh = target.lazy_refresh,
        "connecting to postgres"
    );

    let pool = postgres::create_pool(config, &target).await?;

    if config.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("database migrations applied");
    }

    Ok((
        Arc::new(PostgresLampRepository::new(pool)),
        BackendKind::Postgres,
    ))
}
