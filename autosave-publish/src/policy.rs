//! Access checks for listing and publishing drafts.
//!
//! The pipeline never decides permissions itself; it asks an
//! [`AccessChecker`]. Update checks are field-level: a draft may touch fields
//! the actor can edit and others it cannot.

use autosave_model::Entity;
use autosave_types::{ItemKey, Principal, PrincipalId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wildcard entity type in grants.
pub const ANY_ENTITY_TYPE: &str = "*";

/// Result of an update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied { reason: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides what an actor may see and publish.
pub trait AccessChecker: Send + Sync {
    /// Whether `actor` may see the draft for `key` in listings.
    fn can_view(&self, actor: &Principal, key: &ItemKey) -> bool;

    /// Whether `actor` may change `changed_fields` on the live `entity`.
    fn check_update(
        &self,
        actor: &Principal,
        entity: &Entity,
        changed_fields: &[String],
    ) -> AccessDecision;
}

/// Grants everything. The default when no checker is configured.
pub struct AllowAllAccess;

impl AccessChecker for AllowAllAccess {
    fn can_view(&self, _actor: &Principal, _key: &ItemKey) -> bool {
        true
    }

    fn check_update(&self, _actor: &Principal, _entity: &Entity, _fields: &[String]) -> AccessDecision {
        AccessDecision::Allowed
    }
}

/// Role held by a principal on an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessRole {
    /// May see drafts but not publish them.
    Viewer,
    /// May publish drafts, optionally limited to some fields.
    Editor,
    /// May publish anything on the entity type.
    Admin,
}

#[derive(Debug, Clone)]
struct Grant {
    role: AccessRole,
    /// Editable top-level fields; `None` means all.
    fields: Option<Vec<String>>,
}

/// Per-principal, per-entity-type role grants.
#[derive(Debug, Clone, Default)]
pub struct RoleAccessPolicy {
    grants: HashMap<PrincipalId, HashMap<String, Grant>>,
}

impl RoleAccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `role` on `entity_type` (or [`ANY_ENTITY_TYPE`]).
    #[must_use]
    pub fn grant(mut self, principal: &PrincipalId, entity_type: &str, role: AccessRole) -> Self {
        self.grants
            .entry(principal.clone())
            .or_default()
            .insert(entity_type.to_string(), Grant { role, fields: None });
        self
    }

    /// Grants [`AccessRole::Editor`] on `entity_type`, limited to `fields`.
    #[must_use]
    pub fn grant_fields(mut self, principal: &PrincipalId, entity_type: &str, fields: &[&str]) -> Self {
        self.grants.entry(principal.clone()).or_default().insert(
            entity_type.to_string(),
            Grant {
                role: AccessRole::Editor,
                fields: Some(fields.iter().map(|f| f.to_string()).collect()),
            },
        );
        self
    }

    /// The grant for an exact entity type, falling back to the wildcard.
    fn grant_for(&self, principal: &PrincipalId, entity_type: &str) -> Option<&Grant> {
        let grants = self.grants.get(principal)?;
        grants
            .get(entity_type)
            .or_else(|| grants.get(ANY_ENTITY_TYPE))
    }
}

impl AccessChecker for RoleAccessPolicy {
    fn can_view(&self, actor: &Principal, key: &ItemKey) -> bool {
        self.grant_for(&actor.id, key.entity_type()).is_some()
    }

    fn check_update(
        &self,
        actor: &Principal,
        entity: &Entity,
        changed_fields: &[String],
    ) -> AccessDecision {
        let Some(grant) = self.grant_for(&actor.id, &entity.entity_type) else {
            return AccessDecision::Denied {
                reason: format!("no access to {}", entity.entity_type),
            };
        };

        match (grant.role, &grant.fields) {
            (AccessRole::Viewer, _) => AccessDecision::Denied {
                reason: format!("read-only access to {}", entity.entity_type),
            },
            (AccessRole::Admin, _) | (AccessRole::Editor, None) => AccessDecision::Allowed,
            (AccessRole::Editor, Some(allowed)) => {
                let denied: Vec<&str> = changed_fields
                    .iter()
                    .filter(|f| !allowed.contains(f))
                    .map(String::as_str)
                    .collect();
                if denied.is_empty() {
                    AccessDecision::Allowed
                } else {
                    AccessDecision::Denied {
                        reason: format!("may not edit {}", denied.join(", ")),
                    }
                }
            }
        }
    }
}
