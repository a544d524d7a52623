//! Command implementations for imgbuild-dbctl

pub mod clones;
pub mod composes;

use anyhow::Result;
use serde::Serialize;

/// Write `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
