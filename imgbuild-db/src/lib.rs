//! imgbuild-db: tenant-scoped persistence for image build composes and clones
//!
//! Records compose jobs (image build requests) and clone jobs derived from
//! them, and answers org-scoped, paged, time-windowed queries over both.
//!
//! Callers hold a [`ComposeStore`]: [`PgStore`] in production, or
//! [`MemoryStore`] where a database is not available.

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repos;
pub mod store;

pub use config::DbConfig;
pub use error::{DbError, DbResult, Missing};
pub use memory::MemoryStore;
pub use models::{CloneEntry, ComposeEntry, Page};
pub use pool::{create_pool, create_pool_with_config};
pub use repos::{CloneRepo, ComposeRepo};
pub use store::{ComposeStore, PgStore};

/// Schema used by the integration tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");
