//! Error types for imgbuild-db
//!
//! Every failure coming out of sqlx is classified exactly once, at the
//! repository boundary:
//! - row absence on a single-row read becomes a not-found variant
//! - unique and foreign-key violations become `Constraint`
//! - everything else is passed through as `Connectivity`

use thiserror::Error;

/// Result type alias for imgbuild-db operations
pub type DbResult<T> = Result<T, DbError>;

/// SQLSTATE unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Which record a single-row read was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Compose,
    Clone,
}

#[derive(Error, Debug)]
pub enum DbError {
    /// No compose matches the (job id, org id) pair
    #[error("compose not found")]
    ComposeNotFound,

    /// No clone matches the (id, org id) pair
    #[error("clone not found")]
    CloneNotFound,

    /// Uniqueness or referential violation on insert
    #[error("constraint violation ({code}): {message}")]
    Constraint { code: String, message: String },

    /// Pool exhaustion, transport failure, or any other engine error
    #[error("database error: {0}")]
    Connectivity(#[source] sqlx::Error),

    /// Malformed connection descriptor or unusable settings
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    pub fn not_found(missing: Missing) -> Self {
        match missing {
            Missing::Compose => Self::ComposeNotFound,
            Missing::Clone => Self::CloneNotFound,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// True for both not-found flavors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ComposeNotFound | Self::CloneNotFound)
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    /// Classify the outcome of a single-row read.
    ///
    /// `RowNotFound` means the tenant-scoped lookup matched nothing, which
    /// covers both true absence and rows owned by another org.
    pub(crate) fn classify_row(err: sqlx::Error, missing: Missing) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found(missing),
            other => other.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                if code == UNIQUE_VIOLATION || code == FOREIGN_KEY_VIOLATION {
                    return Self::Constraint {
                        code: code.into_owned(),
                        message: db_err.message().to_owned(),
                    };
                }
            }
        }
        Self::Connectivity(err)
    }
}
