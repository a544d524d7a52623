//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. The pool is opened once
//! at startup and handed to the repositories; a `PoolConnection` goes back to
//! the pool when it is dropped, so every exit path of an operation releases
//! its connection.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};

/// Create a PostgreSQL connection pool with default limits.
///
/// # Errors
///
/// Returns `DbError::Config` if the descriptor is malformed or the first
/// connection cannot be established.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/imgbuild").await?;
/// ```
pub async fn create_pool(database_url: &str) -> DbResult<PgPool> {
    create_pool_with_config(&DbConfig::new(database_url)).await
}

/// Create a PostgreSQL connection pool from a full configuration.
///
/// Settings are checked before anything is handed to sqlx; a zero-size
/// pool is a `DbError::Config`.
pub async fn create_pool_with_config(config: &DbConfig) -> DbResult<PgPool> {
    config.validate()?;

    let options = PgConnectOptions::from_str(&config.database_url)
        .map_err(|e| DbError::config(format!("invalid connection descriptor: {e}")))?;

    info!(
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "Opening database pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await
        .map_err(|e| DbError::config(format!("initial connection failed: {e}")))
}
