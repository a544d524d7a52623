//! Paged results with an independently counted total

use serde::{Deserialize, Serialize};

/// One page of rows plus the size of the whole filtered set.
///
/// `total` comes from a separate count query, so it stays correct no matter
/// which `limit`/`offset` produced `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items for the requested window
    pub items: Vec<T>,
    /// Count of all matching rows
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages of `limit` rows needed to cover `total`.
    pub fn total_pages(&self, limit: i64) -> i64 {
        if self.total <= 0 || limit <= 0 {
            1
        } else {
            (self.total + limit - 1) / limit
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Postgres rejects negative LIMIT/OFFSET; treat them as zero.
pub(crate) fn non_negative(value: i64) -> i64 {
    value.max(0)
}
