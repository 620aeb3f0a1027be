//! Error types for the publish layer.
//!
//! These are the fatal, unexpected failures. Everything a client can act on
//! (stale hashes, missing dependencies, denied fields, invalid content) is
//! reported as [`ItemIssue`](crate::ItemIssue) data, never as an error.

use autosave_types::ItemKey;
use thiserror::Error;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Draft store error.
    #[error("storage error: {0}")]
    Storage(#[from] autosave_storage::StorageError),

    /// Live entity repository error outside the apply step.
    #[error("repository error: {0}")]
    Repository(#[from] autosave_model::RepositoryError),

    /// Writing a live entity failed during apply. Entities written earlier in
    /// the batch were restored where possible; `rolled_back` is false when at
    /// least one restore also failed.
    #[error("failed to apply {key}: {source}")]
    Apply {
        key: ItemKey,
        rolled_back: bool,
        #[source]
        source: autosave_model::RepositoryError,
    },

    /// The publish request body is malformed.
    #[error("invalid publish request: {0}")]
    InvalidRequest(String),

    /// A key could not be built or parsed.
    #[error("invalid key: {0}")]
    Key(#[from] autosave_types::Error),
}
