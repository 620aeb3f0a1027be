//! Contract with the persistent entity store.
//!
//! The repository owns load/save and versioning of live objects. The draft
//! store reads through it to detect divergence; only the publish pipeline
//! writes through it.

use crate::Entity;
use autosave_types::ItemKey;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors raised by an entity repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The addressed entity does not exist.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// The backing store failed.
    #[error("repository backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Load/save access to live entities.
pub trait EntityRepository: Send + Sync {
    /// Loads the live entity for `key`, or `None` when it does not exist.
    fn load(&self, key: &ItemKey) -> RepositoryResult<Option<Entity>>;

    /// Persists `entity` as the new live version.
    fn save(&self, entity: &Entity) -> RepositoryResult<()>;

    /// Keys of entities that must be written before `entity` because it
    /// references them structurally (a region inside a page, a component
    /// instance inside a template).
    fn structural_parents(&self, entity: &Entity) -> Vec<ItemKey> {
        let _ = entity;
        Vec::new()
    }
}
