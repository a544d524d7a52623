//! Compose and clone records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Compose record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ComposeEntry {
    #[sqlx(rename = "job_id")]
    pub id: Uuid,
    /// Full build request, stored as-is
    pub request: Value,
    pub created_at: DateTime<Utc>,
    pub image_name: Option<String>,
}

/// Clone record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CloneEntry {
    pub id: Uuid,
    pub request: Value,
    pub created_at: DateTime<Utc>,
}
