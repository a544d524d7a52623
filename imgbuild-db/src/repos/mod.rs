//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Acquires one pooled connection per operation; dropping it releases it
//! - Rely on DB constraints for uniqueness and references (no check-then-insert)
//! - Tenant scoping lives in the WHERE clause of every read
//! - List operations pair the page with a separate COUNT over the same filter

pub mod clones;
pub mod composes;

pub use clones::CloneRepo;
pub use composes::ComposeRepo;
