//! Tracing setup for imgbuild-dbctl
//!
//! Usage:
//!   imgbuild-dbctl --debug ...                   # Debug logging
//!   RUST_LOG=imgbuild_db=debug imgbuild-dbctl    # Fine-grained log control
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Logging options taken from the command line.
///
/// `RUST_LOG`, when set, always wins; `debug` only picks the fallback level.
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// `--debug`: fall back to `debug` instead of `info` and show event targets
    pub debug: bool,
}

impl TracingConfig {
    fn default_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

/// Install the stderr subscriber. Fails if one is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
