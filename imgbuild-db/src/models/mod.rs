//! Records returned by the repositories
//!
//! Payloads stay as untyped JSON documents; interpreting them belongs to
//! the caller.

pub mod entry;
pub mod page;

pub use entry::{CloneEntry, ComposeEntry};
pub use page::Page;
