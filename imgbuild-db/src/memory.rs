//! In-memory store
//!
//! Mirrors the PostgreSQL semantics for collaborators that test without a
//! database: store-assigned timestamps, key and reference constraints,
//! org scoping, newest-first ordering and windowed counts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::page::non_negative;
use crate::models::{CloneEntry, ComposeEntry, Page};
use crate::store::ComposeStore;

/// Postgres timestamps carry microsecond precision.
const TICK: Duration = Duration::microseconds(1);

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct StoredCompose {
    entry: ComposeEntry,
    org_id: String,
}

struct StoredClone {
    entry: CloneEntry,
    compose_id: Uuid,
}

#[derive(Default)]
struct Tables {
    composes: Vec<StoredCompose>,
    clones: Vec<StoredClone>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Next creation timestamp, strictly after every earlier one.
    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + TICK,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn compose_owned_by(&self, job_id: Uuid, org_id: &str) -> Option<&StoredCompose> {
        self.composes
            .iter()
            .find(|c| c.entry.id == job_id && c.org_id == org_id)
    }

    fn composes_within<'a>(
        &'a self,
        org_id: &'a str,
        since: Duration,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a StoredCompose> + 'a {
        self.composes
            .iter()
            .filter(move |c| c.org_id == org_id && now - c.entry.created_at <= since)
    }
}

/// Store backed by process memory
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    clock: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Use `clock` as the store's "current time" for stamping and windows.
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            clock: Arc::new(clock),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unique_violation(table: &str) -> DbError {
    DbError::Constraint {
        code: "23505".to_string(),
        message: format!("duplicate key value violates unique constraint \"{table}_pkey\""),
    }
}

fn foreign_key_violation() -> DbError {
    DbError::Constraint {
        code: "23503".to_string(),
        message: "insert on table \"clones\" violates foreign key constraint \"clones_compose_id_fkey\""
            .to_string(),
    }
}

fn window<T: Clone>(mut rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = non_negative(offset) as usize;
    let limit = non_negative(limit) as usize;
    if offset >= rows.len() {
        return Vec::new();
    }
    rows.drain(..offset);
    rows.truncate(limit);
    rows
}

#[async_trait]
impl ComposeStore for MemoryStore {
    async fn insert_compose(
        &self,
        job_id: Uuid,
        _account_number: &str,
        org_id: &str,
        image_name: Option<&str>,
        request: &Value,
    ) -> DbResult<()> {
        let now = self.now();
        let mut tables = self.tables.write().await;

        if tables.composes.iter().any(|c| c.entry.id == job_id) {
            return Err(unique_violation("composes"));
        }

        let created_at = tables.stamp(now);
        tables.composes.push(StoredCompose {
            entry: ComposeEntry {
                id: job_id,
                request: request.clone(),
                created_at,
                image_name: image_name.map(str::to_owned),
            },
            org_id: org_id.to_owned(),
        });
        Ok(())
    }

    async fn get_composes(
        &self,
        org_id: &str,
        since: Duration,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<ComposeEntry>> {
        let now = self.now();
        let tables = self.tables.read().await;

        let mut matching: Vec<ComposeEntry> = tables
            .composes_within(org_id, since, now)
            .map(|c| c.entry.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        Ok(Page::new(window(matching, limit, offset), total))
    }

    async fn get_compose(&self, job_id: Uuid, org_id: &str) -> DbResult<ComposeEntry> {
        let tables = self.tables.read().await;
        tables
            .compose_owned_by(job_id, org_id)
            .map(|c| c.entry.clone())
            .ok_or(DbError::ComposeNotFound)
    }

    async fn get_compose_image_type(&self, job_id: Uuid, org_id: &str) -> DbResult<String> {
        let tables = self.tables.read().await;
        let compose = tables
            .compose_owned_by(job_id, org_id)
            .ok_or(DbError::ComposeNotFound)?;

        compose
            .entry
            .request
            .get("image_requests")
            .and_then(Value::as_array)
            .and_then(|requests| requests.first())
            .and_then(|first| first.get("image_type"))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                // ->> renders non-string scalars as their JSON text
                other => Some(other.to_string()),
            })
            .ok_or(DbError::ComposeNotFound)
    }

    async fn count_composes_since(&self, org_id: &str, since: Duration) -> DbResult<i64> {
        let now = self.now();
        let tables = self.tables.read().await;
        Ok(tables.composes_within(org_id, since, now).count() as i64)
    }

    async fn insert_clone(
        &self,
        compose_id: Uuid,
        clone_id: Uuid,
        request: &Value,
    ) -> DbResult<()> {
        let now = self.now();
        let mut tables = self.tables.write().await;

        if tables.clones.iter().any(|c| c.entry.id == clone_id) {
            return Err(unique_violation("clones"));
        }
        if !tables.composes.iter().any(|c| c.entry.id == compose_id) {
            return Err(foreign_key_violation());
        }

        let created_at = tables.stamp(now);
        tables.clones.push(StoredClone {
            entry: CloneEntry {
                id: clone_id,
                request: request.clone(),
                created_at,
            },
            compose_id,
        });
        Ok(())
    }

    async fn get_clones_for_compose(
        &self,
        compose_id: Uuid,
        org_id: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Page<CloneEntry>> {
        let tables = self.tables.read().await;
        if tables.compose_owned_by(compose_id, org_id).is_none() {
            return Ok(Page::empty());
        }

        let mut matching: Vec<CloneEntry> = tables
            .clones
            .iter()
            .filter(|c| c.compose_id == compose_id)
            .map(|c| c.entry.clone())
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        Ok(Page::new(window(matching, limit, offset), total))
    }

    async fn get_clone(&self, id: Uuid, org_id: &str) -> DbResult<CloneEntry> {
        let tables = self.tables.read().await;
        tables
            .clones
            .iter()
            .find(|c| c.entry.id == id)
            .filter(|c| tables.compose_owned_by(c.compose_id, org_id).is_some())
            .map(|c| c.entry.clone())
            .ok_or(DbError::CloneNotFound)
    }
}
