//! PostgreSQL storage adapter.
//!
//! Pool construction from [`DatabaseConfig`], embedded migrations, and the
//! persistent [`LampRepository`](crate::ports::LampRepository)
//! implementation.

mod lamp_repository;

pub use lamp_repository::PostgresLampRepository;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;

use crate::config::{ConnectionTarget, DatabaseConfig};
use crate::domain::foundation::DomainError;

/// Builds a connection pool for the normalized connection target.
///
/// Cloud SQL unix-socket targets override the host with the socket
/// directory; credentials arrive through the URL's query parameters.
///
/// # Errors
///
/// Returns `DatabaseError` when the URL is unparsable or the database is
/// unreachable. Callers treat this as fatal at startup.
pub async fn create_pool(
    config: &DatabaseConfig,
    target: &ConnectionTarget,
) -> Result<PgPool, DomainError> {
    let mut options = PgConnectOptions::from_str(&target.url)
        .map_err(|e| DomainError::database(format!("Invalid database URL: {}", e)))?;

    if let Some(socket_path) = &target.unix_socket_path {
        options = options.socket(socket_path);
    }

    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect_with(options)
        .await
        .map_err(|e| DomainError::database(format!("Failed to connect to database: {}", e)))
}

/// Applies embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database(format!("Migration failed: {}", e)))
}
