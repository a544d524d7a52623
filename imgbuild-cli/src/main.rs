//! imgbuild-dbctl - inspect the imgbuild compose store
//!
//! Read-only access to composes and clones from a terminal:
//! - `ping` opens the pool and fails fast on a bad descriptor
//! - `composes` lists, fetches and counts composes for an org
//! - `clones` lists and fetches clones through their parent compose

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgbuild_db::{DbConfig, PgStore};
use tracing::info;

mod commands;
mod tracing_setup;

use commands::{clones::CloneArgs, composes::ComposeArgs};
use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "imgbuild-dbctl",
    author,
    version,
    about = "Inspect image build composes and clones stored in PostgreSQL"
)]
struct Cli {
    /// PostgreSQL connection string (falls back to DATABASE_URL / .env)
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, global = true)]
    max_connections: Option<u32>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the connection pool and report whether the database is reachable
    Ping,
    /// Query composes for an organization
    Composes(ComposeArgs),
    /// Query clones of a compose
    Clones(CloneArgs),
}

impl Cli {
    fn db_config(&self) -> Result<DbConfig> {
        let mut config = match &self.database_url {
            Some(url) => DbConfig::new(url.clone()),
            None => DbConfig::from_env().context("no database configured")?,
        };
        if let Some(max) = self.max_connections {
            config = config.with_max_connections(max);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })?;

    let config = cli.db_config()?;
    let store = PgStore::connect(&config)
        .await
        .context("failed to open database pool")?;

    let result = match cli.command {
        Commands::Ping => {
            info!("database reachable");
            commands::print_json(&serde_json::json!({ "status": "ok" }))
        }
        Commands::Composes(args) => commands::composes::run(&store, args).await,
        Commands::Clones(args) => commands::clones::run(&store, args).await,
    };

    store.close().await;
    result
}
