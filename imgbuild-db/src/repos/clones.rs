//! Clone repository
//!
//! Clones carry no org id of their own. Every read joins the parent compose
//! and filters on its org id in the same statement, so ownership is checked
//! atomically with the read.

use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, Missing};
use crate::models::page::non_negative;
use crate::models::{CloneEntry, Page};

/// Clone repository
pub struct CloneRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CloneRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a clone of `compose_id`.
    ///
    /// The foreign key on `compose_id` is left to the database: an unknown
    /// compose or a colliding `clone_id` surfaces as `DbError::Constraint`.
    pub async fn insert(&self, compose_id: Uuid, clone_id: Uuid, request: &Value) -> DbResult<()> {
        debug!(%compose_id, %clone_id, "insert clone");
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            INSERT INTO clones (id, compose_id, request, created_at)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(clone_id)
        .bind(compose_id)
        .bind(request)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// List clones of a compose owned by `org_id`, newest first.
    ///
    /// A compose owned by another org yields an empty page, not an error.
    pub async fn list_for_compose(
        &self,
        compose_id: Uuid,
        org_id: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<CloneEntry>> {
        debug!(%compose_id, org_id, limit, offset, "list clones");
        let mut conn = self.pool.acquire().await?;

        let items = sqlx::query_as::<_, CloneEntry>(
            r#"
            SELECT cl.id, cl.request, cl.created_at
            FROM clones cl
            JOIN composes c ON c.job_id = cl.compose_id
            WHERE cl.compose_id = $1 AND c.org_id = $2
            ORDER BY cl.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(compose_id)
        .bind(org_id)
        .bind(non_negative(limit))
        .bind(non_negative(offset))
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM clones cl
            JOIN composes c ON c.job_id = cl.compose_id
            WHERE cl.compose_id = $1 AND c.org_id = $2
            "#,
        )
        .bind(compose_id)
        .bind(org_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(Page::new(items, total))
    }

    /// Get a single clone whose parent compose is owned by `org_id`.
    pub async fn get(&self, id: Uuid, org_id: &str) -> DbResult<CloneEntry> {
        debug!(clone_id = %id, org_id, "get clone");
        let mut conn = self.pool.acquire().await?;

        sqlx::query_as::<_, CloneEntry>(
            r#"
            SELECT cl.id, cl.request, cl.created_at
            FROM clones cl
            JOIN composes c ON c.job_id = cl.compose_id
            WHERE cl.id = $1 AND c.org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DbError::classify_row(e, Missing::Clone))
    }
}
