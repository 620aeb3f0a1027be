use autosave_types::{ItemKey, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether an entity is editorial content or site configuration.
///
/// Config entities allow their status flag and label to change on the live
/// object while a draft exists; see the draft store's config reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Content,
    Config,
}

/// A live entity as held by the host repository.
///
/// The `data` field is the normalized snapshot of the entity's editable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub id: String,
    #[serde(default)]
    pub langcode: Option<String>,
    pub kind: EntityKind,
    pub label: String,
    pub data: serde_json::Value,
}

impl Entity {
    /// The draft key addressing this entity.
    pub fn key(&self) -> Result<ItemKey> {
        match &self.langcode {
            Some(lang) => ItemKey::translated(&self.entity_type, &self.id, lang),
            None => ItemKey::new(&self.entity_type, &self.id),
        }
    }

    /// Returns a transient copy of this entity carrying `snapshot` as its data.
    ///
    /// The label follows the snapshot's `/label` or `/title` when it has one.
    #[must_use]
    pub fn with_snapshot(&self, snapshot: &serde_json::Value) -> Self {
        let label = snapshot_label(snapshot).unwrap_or(&self.label).to_string();
        Self {
            label,
            data: snapshot.clone(),
            ..self.clone()
        }
    }

    /// Extract a string value from `data` using a JSON pointer (e.g., "/title").
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.data.pointer(pointer).and_then(|v| v.as_str())
    }

    /// Extract a boolean value from `data` using a JSON pointer.
    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.data.pointer(pointer).and_then(|v| v.as_bool())
    }
}

fn snapshot_label(snapshot: &serde_json::Value) -> Option<&str> {
    ["/label", "/title"]
        .iter()
        .find_map(|p| snapshot.pointer(p).and_then(|v| v.as_str()))
}

/// Top-level fields whose values differ between `live` and `snapshot`.
///
/// Fields present on only one side count as changed. Non-object snapshots are
/// compared whole and reported as the empty field name.
pub fn changed_fields(live: &serde_json::Value, snapshot: &serde_json::Value) -> Vec<String> {
    let (Some(live_obj), Some(draft_obj)) = (live.as_object(), snapshot.as_object()) else {
        return if live == snapshot {
            Vec::new()
        } else {
            vec![String::new()]
        };
    };

    let names: BTreeSet<&String> = live_obj.keys().chain(draft_obj.keys()).collect();
    names
        .into_iter()
        .filter(|name| live_obj.get(*name) != draft_obj.get(*name))
        .cloned()
        .collect()
}
