//! Auto-save operator tool
//!
//! Inspects and publishes the drafts held in an on-disk draft store against
//! an on-disk entity store.
//!
//! Usage:
//!   autosave --drafts-db drafts.db --entities-db entities.db list
//!   autosave --drafts-db drafts.db --entities-db entities.db publish -r request.json

use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Result;
use autosave_cli::{execute, load_config, open_api, Command};
use autosave_types::Principal;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autosave")]
#[command(about = "Inspect and publish auto-save drafts")]
struct Args {
    /// Draft store database
    #[arg(long, env = "AUTOSAVE_DRAFTS_DB", default_value = "drafts.db")]
    drafts_db: PathBuf,

    /// Live entity store database
    #[arg(long, env = "AUTOSAVE_ENTITIES_DB", default_value = "entities.db")]
    entities_db: PathBuf,

    /// Publish configuration (TOML)
    #[arg(short, long, env = "AUTOSAVE_CONFIG")]
    config: Option<PathBuf>,

    /// Principal id to act as
    #[arg(long, default_value = "cli")]
    actor: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(args.config.as_deref())?;
    let api = open_api(&args.drafts_db, &args.entities_db, config)?;
    let actor = Principal::new(args.actor.as_str(), args.actor.clone());

    let response = execute(&api, &args.command, &actor)?;
    if let Some(body) = &response.body {
        println!("{}", serde_json::to_string_pretty(body)?);
    }

    if response.status >= 400 {
        warn!("{:?} failed with status {}", args.command, response.status);
        return Ok(ExitCode::FAILURE);
    }
    info!("{:?} finished with status {}", args.command, response.status);
    Ok(ExitCode::SUCCESS)
}
