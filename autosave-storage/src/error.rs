//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The live entity a draft refers to does not exist.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Error from the live entity repository.
    #[error("repository error: {0}")]
    Repository(#[from] autosave_model::RepositoryError),

    /// Invalid data read back from the database.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A previous holder of the connection panicked.
    #[error("storage lock poisoned")]
    Lock,
}

impl From<autosave_types::Error> for StorageError {
    fn from(e: autosave_types::Error) -> Self {
        Self::InvalidData(e.to_string())
    }
}
