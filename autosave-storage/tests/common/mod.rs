#![allow(dead_code)]

use autosave_model::{Entity, EntityKind};
use autosave_storage::EntityStore;
use autosave_types::{ItemKey, Principal};
use serde_json::json;

pub fn key(s: &str) -> ItemKey {
    s.parse().unwrap()
}

pub fn alice() -> Principal {
    Principal::new("1", "alice")
}

pub fn bob() -> Principal {
    Principal::new("2", "bob")
}

pub fn node(id: &str, data: serde_json::Value) -> Entity {
    Entity {
        entity_type: "node".into(),
        id: id.into(),
        langcode: Some("en".into()),
        kind: EntityKind::Content,
        label: format!("Node {id}"),
        data,
    }
}

pub fn js_component(id: &str, data: serde_json::Value) -> Entity {
    Entity {
        entity_type: "js_component".into(),
        id: id.into(),
        langcode: None,
        kind: EntityKind::Config,
        label: id.to_string(),
        data,
    }
}

/// Entity store seeded with `node:1:en` and `js_component:hero`.
pub fn seeded_repo() -> EntityStore {
    let repo = EntityStore::open_in_memory().unwrap();
    repo.put(&node("1", json!({"title": "Home", "body": "live"}))).unwrap();
    repo.put(&js_component(
        "hero",
        json!({"status": true, "label": "Hero", "source": "export default 1"}),
    ))
    .unwrap();
    repo
}
