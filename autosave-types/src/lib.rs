//! Core type definitions for the auto-save draft overlay.
//!
//! This crate defines the small value types every other layer trades in:
//! - [`ItemKey`]: stable identity of a draft (entity type, id, optional language)
//! - [`Principal`] / [`PrincipalId`]: the editor that owns a draft or publishes
//! - [`Timestamp`]: wall-clock time of the last draft write
//!
//! Nothing here knows about storage, hashing or publishing.

mod key;
mod principal;
mod timestamp;

pub use key::ItemKey;
pub use principal::{Principal, PrincipalId};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid item key: {0}")]
    InvalidKey(String),
}
