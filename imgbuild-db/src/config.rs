//! Database configuration
//!
//! Settings come from the environment (optionally seeded from a `.env`
//! file) or from a `[database]` table in a TOML document.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a free connection before failing.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "IMGBUILD_DB_MAX_CONNECTIONS";
pub const ACQUIRE_TIMEOUT_VAR: &str = "IMGBUILD_DB_ACQUIRE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DbConfig,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_SECS
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }

    /// Load from environment variables.
    ///
    /// A `.env` file in the current directory is read first; variables that
    /// are already set win over it.
    pub fn from_env() -> DbResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded .env from {}", path.display());
        }

        let database_url = env::var(DATABASE_URL_VAR)
            .map_err(|_| DbError::config(format!("{DATABASE_URL_VAR} not set")))?;

        let mut config = Self::new(database_url);
        if let Some(max) = parse_var::<u32>(MAX_CONNECTIONS_VAR)? {
            config.max_connections = max;
        }
        if let Some(secs) = parse_var::<u64>(ACQUIRE_TIMEOUT_VAR)? {
            config.acquire_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse the `[database]` table of a TOML document.
    pub fn from_toml_str(contents: &str) -> DbResult<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| DbError::config(format!("invalid database config: {e}")))?;
        file.database.validate()?;
        Ok(file.database)
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub(crate) fn validate(&self) -> DbResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(DbError::config("database_url is empty"));
        }
        if self.max_connections == 0 {
            return Err(DbError::config("max_connections must be at least 1"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> DbResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DbError::config(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}
