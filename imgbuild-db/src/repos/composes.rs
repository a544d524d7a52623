//! Compose repository
//!
//! Handles compose records scoped by org id:
//! - insert: single INSERT, creation time from the database clock
//! - get / image type: a job id owned by another org reads as not found
//! - list: time-windowed page plus a dedicated COUNT over the same window

use chrono::Duration;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, Missing};
use crate::models::page::non_negative;
use crate::models::{ComposeEntry, Page};

const COUNT_SINCE: &str = r#"
    SELECT COUNT(*)
    FROM composes
    WHERE org_id = $1 AND CURRENT_TIMESTAMP - created_at <= $2
"#;

/// Compose repository
pub struct ComposeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ComposeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a compose. `created_at` is set by the database.
    ///
    /// A colliding `job_id` surfaces as `DbError::Constraint`.
    pub async fn insert(
        &self,
        job_id: Uuid,
        account_number: &str,
        org_id: &str,
        image_name: Option<&str>,
        request: &Value,
    ) -> DbResult<()> {
        debug!(%job_id, org_id, "insert compose");
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            INSERT INTO composes (job_id, request, created_at, account_number, org_id, image_name)
            VALUES ($1, $2, CURRENT_TIMESTAMP, $3, $4, $5)
            "#,
        )
        .bind(job_id)
        .bind(request)
        .bind(account_number)
        .bind(org_id)
        .bind(image_name)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Get a single compose owned by `org_id`.
    pub async fn get(&self, job_id: Uuid, org_id: &str) -> DbResult<ComposeEntry> {
        debug!(%job_id, org_id, "get compose");
        let mut conn = self.pool.acquire().await?;

        sqlx::query_as::<_, ComposeEntry>(
            r#"
            SELECT job_id, request, created_at, image_name
            FROM composes
            WHERE org_id = $1 AND job_id = $2
            "#,
        )
        .bind(org_id)
        .bind(job_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::classify_row(e, Missing::Compose))
    }

    /// Image type declared by the first image request of the stored payload.
    ///
    /// The projection runs in the database; the payload never leaves it.
    /// A compose without a typed first image request reads as not found.
    pub async fn image_type(&self, job_id: Uuid, org_id: &str) -> DbResult<String> {
        debug!(%job_id, org_id, "get compose image type");
        let mut conn = self.pool.acquire().await?;

        let image_type: Option<String> = sqlx::query_scalar(
            r#"
            SELECT request->'image_requests'->0->>'image_type'
            FROM composes
            WHERE org_id = $1 AND job_id = $2
            "#,
        )
        .bind(org_id)
        .bind(job_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::classify_row(e, Missing::Compose))?;

        image_type.ok_or(DbError::ComposeNotFound)
    }

    /// List composes created within `since`, newest first.
    ///
    /// The page and the total are two reads on the same connection without
    /// a transaction; a concurrent insert may land between them.
    pub async fn list(
        &self,
        org_id: &str,
        since: Duration,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<ComposeEntry>> {
        debug!(org_id, since_secs = since.num_seconds(), limit, offset, "list composes");
        let mut conn = self.pool.acquire().await?;

        let items = sqlx::query_as::<_, ComposeEntry>(
            r#"
            SELECT job_id, request, created_at, image_name
            FROM composes
            WHERE org_id = $1 AND CURRENT_TIMESTAMP - created_at <= $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(org_id)
        .bind(since)
        .bind(non_negative(limit))
        .bind(non_negative(offset))
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar(COUNT_SINCE)
            .bind(org_id)
            .bind(since)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Page::new(items, total))
    }

    /// Count composes created within `since` without fetching rows.
    pub async fn count_since(&self, org_id: &str, since: Duration) -> DbResult<i64> {
        debug!(org_id, since_secs = since.num_seconds(), "count composes");
        let mut conn = self.pool.acquire().await?;

        let total = sqlx::query_scalar(COUNT_SINCE)
            .bind(org_id)
            .bind(since)
            .fetch_one(&mut *conn)
            .await?;

        Ok(total)
    }
}
