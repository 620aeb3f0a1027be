//! Optimistic multi-entity publishing for the auto-save draft overlay.
//!
//! Editors stage changes as drafts in a [`DraftStore`](autosave_storage::DraftStore).
//! A publish moves a batch of drafts onto their live entities, all or nothing.
//!
//! # Architecture
//!
//! - **Conflict detection**: the client's expected hashes against stored drafts
//! - **Dependencies**: co-publish rules such as "code components go live with
//!   the global asset library"
//! - **Policy**: field-level update checks through an [`AccessChecker`]
//! - **Coordinator**: runs the phases and applies the batch
//! - **API**: the JSON endpoints as status/body pairs
//!
//! Every phase before apply only reads. A rejected batch carries the full list
//! of itemized [`ItemIssue`]s for its phase.
//!
//! # Example
//!
//! ```
//! use autosave_publish::{PublishConfig, PublishOutcome, PublishRequest, Publisher};
//! use autosave_storage::{DraftStore, EntityStore};
//! use autosave_types::Principal;
//! use std::sync::Arc;
//!
//! let drafts = DraftStore::open_in_memory().unwrap();
//! let entities = EntityStore::open_in_memory().unwrap();
//! let publisher = Publisher::new(drafts, Arc::new(entities), PublishConfig::default());
//!
//! let editor = Principal::new("1", "Editor");
//! let outcome = publisher.publish(&PublishRequest::all(), &editor).unwrap();
//! assert_eq!(outcome, PublishOutcome::Success(0));
//! ```

mod api;
mod config;
pub mod conflict;
mod coordinator;
pub mod dependency;
mod error;
pub mod policy;
mod request;

pub use api::{ApiResponse, AutoSaveApi};
pub use config::{
    DependencyRule, PublishConfig, GLOBAL_ASSET_LIBRARY, GLOBAL_ASSET_NOT_PUBLISHED,
    JS_COMPONENT_TYPE,
};
pub use coordinator::Publisher;
pub use dependency::{DependencyEnforcer, RequiredAddition};
pub use error::{PublishError, PublishResult};
pub use policy::{
    AccessChecker, AccessDecision, AccessRole, AllowAllAccess, RoleAccessPolicy, ANY_ENTITY_TYPE,
};
pub use request::{
    FailurePhase, IssueKind, IssueMeta, ItemIssue, PublishFailure, PublishOutcome, PublishRequest,
};
