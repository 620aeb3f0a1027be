//! Operator commands over on-disk auto-save stores.
//!
//! The binary parses arguments and installs logging; everything that touches
//! the stores lives here so it can be driven from tests.

use anyhow::{Context, Result};
use autosave_publish::{ApiResponse, AutoSaveApi, PublishConfig, Publisher};
use autosave_storage::{DraftStore, EntityStore};
use autosave_types::{ItemKey, Principal};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// What to do with the draft store.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List every pending draft
    List,

    /// Show one item with its draft (or live) data
    Show {
        /// Item key, e.g. node:1:en
        key: ItemKey,

        /// Further keys of the edit session to report in autoSaves
        #[arg(long = "session")]
        session: Vec<ItemKey>,
    },

    /// Publish drafts onto their live entities
    Publish {
        /// JSON file mapping item keys to {"data_hash": ...}; omit to publish all
        #[arg(short, long)]
        request: Option<PathBuf>,
    },

    /// Discard the drafts of every translation of one entity
    Discard { entity_type: String, entity_id: String },

    /// Drop every draft
    Clear,
}

/// Loads the publish configuration, falling back to defaults without a file.
pub fn load_config(path: Option<&Path>) -> Result<PublishConfig> {
    let Some(path) = path else {
        return Ok(PublishConfig::default());
    };
    info!("Loading publish config from {:?}", path);
    let raw = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&raw).context("Failed to parse config file")
}

/// Opens both stores and wires a publisher over them.
pub fn open_api(drafts_db: &Path, entities_db: &Path, config: PublishConfig) -> Result<AutoSaveApi> {
    let drafts = DraftStore::open(drafts_db).context("Failed to open draft store")?;
    let entities = EntityStore::open(entities_db).context("Failed to open entity store")?;
    debug!(
        "{} drafts pending in {:?}",
        drafts.len().context("Failed to count drafts")?,
        drafts_db
    );
    Ok(AutoSaveApi::new(Publisher::new(drafts, Arc::new(entities), config)))
}

/// Runs one command as `actor`.
pub fn execute(api: &AutoSaveApi, command: &Command, actor: &Principal) -> Result<ApiResponse> {
    let response = match command {
        Command::List => api.list(actor),
        Command::Show { key, session } => api.get_item(key, session),
        Command::Publish { request } => {
            let body = match request {
                Some(path) => {
                    let raw = fs::read_to_string(path).context("Failed to read publish request")?;
                    Some(serde_json::from_str(&raw).context("Publish request is not valid JSON")?)
                }
                None => None,
            };
            api.publish_all(body.as_ref(), actor)
        }
        Command::Discard {
            entity_type,
            entity_id,
        } => api.discard(entity_type, entity_id),
        Command::Clear => {
            api.teardown().context("Failed to clear drafts")?;
            ApiResponse::no_content()
        }
    };
    Ok(response)
}
