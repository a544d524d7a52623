//! Clone queries

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use imgbuild_db::ComposeStore;
use serde_json::Value;
use uuid::Uuid;

use super::print_json;

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Organization owning the parent compose
    #[arg(long, global = true)]
    pub org_id: Option<String>,

    #[command(subcommand)]
    pub command: CloneCommand,
}

#[derive(Subcommand, Debug)]
pub enum CloneCommand {
    /// List clones of a compose, newest first
    List {
        /// Parent compose job ID
        compose_id: Uuid,

        /// Page size
        #[arg(long, default_value = "100")]
        limit: i64,

        /// Rows to skip
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Show a single clone
    Get {
        /// Clone ID
        id: Uuid,
    },
}

pub async fn run(store: &dyn ComposeStore, args: CloneArgs) -> Result<()> {
    let output = query(store, args).await?;
    print_json(&output)
}

/// Run the query and return what would be printed.
pub async fn query(store: &dyn ComposeStore, args: CloneArgs) -> Result<Value> {
    let org_id = args.org_id.context("--org-id is required")?;

    let output = match args.command {
        CloneCommand::List {
            compose_id,
            limit,
            offset,
        } => {
            let page = store
                .get_clones_for_compose(compose_id, &org_id, limit, offset)
                .await?;
            serde_json::to_value(page)?
        }
        CloneCommand::Get { id } => {
            let clone = store.get_clone(id, &org_id).await?;
            serde_json::to_value(clone)?
        }
    };
    Ok(output)
}
