//! Entity model for the auto-save draft overlay.
//!
//! Defines the types the draft store and the publish pipeline share:
//! - [`Entity`]: a live object as the host repository exposes it
//! - [`content_hash`]: the order-independent digest of a normalized snapshot
//! - [`EntitySchema`] / [`SchemaValidator`]: per-type content validation
//! - [`EntityRepository`]: the contract with the persistent entity store
//!
//! Snapshots are plain `serde_json::Value`s. Their shape belongs to the host
//! serializer; this crate only hashes them, diffs their top-level fields, and
//! materializes them onto entity copies.

mod entity;
mod hash;
mod repository;
mod schema;
mod validator;

pub use entity::{changed_fields, Entity, EntityKind};
pub use hash::content_hash;
pub use repository::{EntityRepository, RepositoryError, RepositoryResult};
pub use schema::{EntitySchema, FieldType, SchemaField};
pub use validator::{EntityValidator, NoopValidator, SchemaValidator, Violation};
