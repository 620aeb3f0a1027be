mod common;

use autosave_model::EntityRepository;
use autosave_storage::EntityStore;
use common::{js_component, key, node};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn put_and_load() {
    let store = EntityStore::open_in_memory().unwrap();
    let entity = node("5", json!({"title": "Five"}));
    store.put(&entity).unwrap();

    let loaded = store.load(&key("node:5:en")).unwrap().unwrap();
    assert_eq!(loaded, entity);
}

#[test]
fn load_missing_is_none() {
    let store = EntityStore::open_in_memory().unwrap();
    assert!(store.load(&key("node:404:en")).unwrap().is_none());
}

#[test]
fn save_replaces_live_version() {
    let store = EntityStore::open_in_memory().unwrap();
    store.save(&js_component("hero", json!({"status": true}))).unwrap();
    store.save(&js_component("hero", json!({"status": false}))).unwrap();

    let loaded = store.load(&key("js_component:hero")).unwrap().unwrap();
    assert_eq!(loaded.data, json!({"status": false}));
}

#[test]
fn default_has_no_structural_parents() {
    let store = EntityStore::open_in_memory().unwrap();
    assert!(store.structural_parents(&node("1", json!({}))).is_empty());
}

#[test]
fn file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live.db");
    {
        let store = EntityStore::open(&path).unwrap();
        store.put(&node("1", json!({"title": "Home"}))).unwrap();
    }
    let store = EntityStore::open(&path).unwrap();
    assert_eq!(
        store.get(&key("node:1:en")).unwrap().unwrap().data,
        json!({"title": "Home"})
    );
}
