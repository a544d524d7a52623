//! The store interface collaborators program against

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DbConfig;
use crate::error::DbResult;
use crate::models::{CloneEntry, ComposeEntry, Page};
use crate::pool::create_pool_with_config;
use crate::repos::{CloneRepo, ComposeRepo};

/// All compose and clone operations.
///
/// Implementations are stateless apart from their backing storage and safe
/// to share across tasks. Reads are always scoped by `org_id`.
#[async_trait]
pub trait ComposeStore: Send + Sync {
    async fn insert_compose(
        &self,
        job_id: Uuid,
        account_number: &str,
        org_id: &str,
        image_name: Option<&str>,
        request: &Value,
    ) -> DbResult<()>;

    async fn get_composes(
        &self,
        org_id: &str,
        since: Duration,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<ComposeEntry>>;

    async fn get_compose(&self, job_id: Uuid, org_id: &str) -> DbResult<ComposeEntry>;

    async fn get_compose_image_type(&self, job_id: Uuid, org_id: &str) -> DbResult<String>;

    async fn count_composes_since(&self, org_id: &str, since: Duration) -> DbResult<i64>;

    async fn insert_clone(&self, compose_id: Uuid, clone_id: Uuid, request: &Value)
        -> DbResult<()>;

    async fn get_clones_for_compose(
        &self,
        compose_id: Uuid,
        org_id: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<CloneEntry>>;

    async fn get_clone(&self, id: Uuid, org_id: &str) -> DbResult<CloneEntry>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open the pool described by `config`, failing fast on a bad descriptor.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        let pool = create_pool_with_config(config).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn composes(&self) -> ComposeRepo<'_> {
        ComposeRepo::new(&self.pool)
    }

    pub fn clones(&self) -> CloneRepo<'_> {
        CloneRepo::new(&self.pool)
    }

    /// Close the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ComposeStore for PgStore {
    async fn insert_compose(
        &self,
        job_id: Uuid,
        account_number: &str,
        org_id: &str,
        image_name: Option<&str>,
        request: &Value,
    ) -> DbResult<()> {
        self.composes()
            .insert(job_id, account_number, org_id, image_name, request)
            .await
    }

    async fn get_composes(
        &self,
        org_id: &str,
        since: Duration,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<ComposeEntry>> {
        self.composes().list(org_id, since, limit, offset).await
    }

    async fn get_compose(&self, job_id: Uuid, org_id: &str) -> DbResult<ComposeEntry> {
        self.composes().get(job_id, org_id).await
    }

    async fn get_compose_image_type(&self, job_id: Uuid, org_id: &str) -> DbResult<String> {
        self.composes().image_type(job_id, org_id).await
    }

    async fn count_composes_since(&self, org_id: &str, since: Duration) -> DbResult<i64> {
        self.composes().count_since(org_id, since).await
    }

    async fn insert_clone(
        &self,
        compose_id: Uuid,
        clone_id: Uuid,
        request: &Value,
    ) -> DbResult<()> {
        self.clones().insert(compose_id, clone_id, request).await
    }

    async fn get_clones_for_compose(
        &self,
        compose_id: Uuid,
        org_id: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<CloneEntry>> {
        self.clones()
            .list_for_compose(compose_id, org_id, limit, offset)
            .await
    }

    async fn get_clone(&self, id: Uuid, org_id: &str) -> DbResult<CloneEntry> {
        self.clones().get(id, org_id).await
    }
}
