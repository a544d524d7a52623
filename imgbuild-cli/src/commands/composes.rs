//! Compose queries

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Args, Subcommand};
use imgbuild_db::ComposeStore;
use serde_json::{json, Value};
use uuid::Uuid;

use super::print_json;

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Organization the composes belong to
    #[arg(long, global = true)]
    pub org_id: Option<String>,

    #[command(subcommand)]
    pub command: ComposeCommand,
}

#[derive(Subcommand, Debug)]
pub enum ComposeCommand {
    /// List composes created in the last N hours, newest first
    List {
        /// Window size in hours
        #[arg(long, default_value = "336")]
        since_hours: i64,

        /// Page size
        #[arg(long, default_value = "100")]
        limit: i64,

        /// Rows to skip
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Show a single compose
    Get {
        /// Compose job ID
        job_id: Uuid,
    },
    /// Show the image type of a compose's first image request
    ImageType {
        /// Compose job ID
        job_id: Uuid,
    },
    /// Count composes created in the last N hours
    Count {
        /// Window size in hours
        #[arg(long, default_value = "336")]
        since_hours: i64,
    },
}

pub async fn run(store: &dyn ComposeStore, args: ComposeArgs) -> Result<()> {
    let output = query(store, args).await?;
    print_json(&output)
}

/// Run the query and return what would be printed.
pub async fn query(store: &dyn ComposeStore, args: ComposeArgs) -> Result<Value> {
    let org_id = args.org_id.context("--org-id is required")?;

    let output = match args.command {
        ComposeCommand::List {
            since_hours,
            limit,
            offset,
        } => {
            let page = store
                .get_composes(&org_id, window(since_hours)?, limit, offset)
                .await?;
            serde_json::to_value(page)?
        }
        ComposeCommand::Get { job_id } => {
            let compose = store.get_compose(job_id, &org_id).await?;
            serde_json::to_value(compose)?
        }
        ComposeCommand::ImageType { job_id } => {
            let image_type = store.get_compose_image_type(job_id, &org_id).await?;
            json!({ "job_id": job_id, "image_type": image_type })
        }
        ComposeCommand::Count { since_hours } => {
            let count = store
                .count_composes_since(&org_id, window(since_hours)?)
                .await?;
            json!({ "org_id": org_id, "count": count })
        }
    };
    Ok(output)
}

fn window(since_hours: i64) -> Result<Duration> {
    Duration::try_hours(since_hours).context("--since-hours out of range")
}
