mod common;

use autosave_model::content_hash;
use autosave_storage::{DraftFilter, DraftStore, SaveOutcome, StorageError, CONFIG_LIVE_FIELDS};
use common::{alice, bob, js_component, key, seeded_repo};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config_fields() -> Vec<String> {
    CONFIG_LIVE_FIELDS.iter().map(|f| f.to_string()).collect()
}

// ── save ─────────────────────────────────────────────────────────

#[test]
fn divergent_save_creates_record() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");
    let snapshot = json!({"title": "Welcome", "body": "draft"});

    let outcome = store.save(&k, snapshot.clone(), &alice(), &repo).unwrap();
    assert_eq!(outcome, SaveOutcome::Stored(content_hash(&snapshot)));

    let record = store.get(&k).unwrap().unwrap();
    assert_eq!(record.key, k);
    assert_eq!(record.snapshot, snapshot);
    assert_eq!(record.data_hash, content_hash(&snapshot));
    assert_eq!(record.owner, alice());
    assert_eq!(record.label, "Welcome");
}

#[test]
fn saving_live_snapshot_collapses() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");

    let outcome = store
        .save(&k, json!({"body": "live", "title": "Home"}), &alice(), &repo)
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Collapsed);
    assert!(store.get(&k).unwrap().is_none());
}

#[test]
fn saving_live_snapshot_removes_existing_draft() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");

    store.save(&k, json!({"title": "x"}), &alice(), &repo).unwrap();
    assert!(store.get(&k).unwrap().is_some());

    store
        .save(&k, json!({"title": "Home", "body": "live"}), &alice(), &repo)
        .unwrap();
    assert!(store.get(&k).unwrap().is_none());
    assert!(store.is_empty().unwrap());
}

#[test]
fn resave_yields_same_hash() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");

    let first = store.save(&k, json!({"a": 1, "b": 2}), &alice(), &repo).unwrap();
    let second = store.save(&k, json!({"b": 2, "a": 1}), &alice(), &repo).unwrap();
    assert_eq!(first, second);
}

#[test]
fn last_writer_wins() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");

    store.save(&k, json!({"title": "alice"}), &alice(), &repo).unwrap();
    store.save(&k, json!({"title": "bob"}), &bob(), &repo).unwrap();

    let record = store.get(&k).unwrap().unwrap();
    assert_eq!(record.snapshot, json!({"title": "bob"}));
    assert_eq!(record.owner, bob());
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn save_without_live_entity_fails() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let err = store
        .save(&key("node:99:en"), json!({}), &alice(), &repo)
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(k) if k == "node:99:en"));
}

// ── delete / clear ───────────────────────────────────────────────

#[test]
fn delete_is_idempotent() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");
    store.save(&k, json!({"title": "x"}), &alice(), &repo).unwrap();

    assert!(store.delete(&k).unwrap());
    assert!(!store.delete(&k).unwrap());
    assert!(store.get(&k).unwrap().is_none());
}

#[test]
fn delete_entity_removes_all_translations() {
    let repo = seeded_repo();
    repo.put(&autosave_model::Entity {
        langcode: Some("fr".into()),
        ..common::node("1", json!({"title": "Accueil"}))
    })
    .unwrap();
    let store = DraftStore::open_in_memory().unwrap();
    store.save(&key("node:1:en"), json!({"title": "a"}), &alice(), &repo).unwrap();
    store.save(&key("node:1:fr"), json!({"title": "b"}), &alice(), &repo).unwrap();
    store
        .save(&key("js_component:hero"), json!({"status": false}), &alice(), &repo)
        .unwrap();

    assert_eq!(store.delete_entity("node", "1").unwrap(), 2);
    assert_eq!(store.delete_entity("node", "1").unwrap(), 0);
    assert_eq!(store.keys().unwrap(), vec![key("js_component:hero")]);
}

#[test]
fn clear_removes_everything() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    store.save(&key("node:1:en"), json!({"title": "a"}), &alice(), &repo).unwrap();
    store
        .save(&key("js_component:hero"), json!({"status": false}), &bob(), &repo)
        .unwrap();

    store.clear().unwrap();
    assert!(store.is_empty().unwrap());
    assert!(store.list(&DraftFilter::all()).unwrap().is_empty());
}

// ── list ─────────────────────────────────────────────────────────

#[test]
fn list_filters_by_owner_and_type() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    store.save(&key("node:1:en"), json!({"title": "a"}), &alice(), &repo).unwrap();
    store
        .save(&key("js_component:hero"), json!({"status": false}), &bob(), &repo)
        .unwrap();

    let all = store.list(&DraftFilter::all()).unwrap();
    let keys: Vec<&str> = all.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["js_component:hero", "node:1:en"]);

    let alices = store.list(&DraftFilter::all().owned_by(alice().id)).unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].key, key("node:1:en"));

    let components = store
        .list(&DraftFilter::all().of_type("js_component").owned_by(alice().id))
        .unwrap();
    assert!(components.is_empty());
}

// ── Config field reconciliation ──────────────────────────────────

#[test]
fn live_status_change_patches_draft() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("js_component:hero");
    store
        .save(
            &k,
            json!({"status": true, "label": "Hero", "source": "export default 2"}),
            &alice(),
            &repo,
        )
        .unwrap();

    let live = js_component(
        "hero",
        json!({"status": false, "label": "Big hero", "source": "export default 1"}),
    );
    repo.put(&live).unwrap();
    let outcome = store.reconcile_config_fields(&live, &config_fields()).unwrap();

    let record = store.get(&k).unwrap().unwrap();
    let expected = json!({"status": false, "label": "Big hero", "source": "export default 2"});
    assert_eq!(record.snapshot, expected);
    assert_eq!(record.label, "Big hero");
    assert_eq!(outcome, Some(SaveOutcome::Stored(content_hash(&expected))));
    assert_eq!(record.owner, alice());
}

#[test]
fn config_sync_collapses_when_only_those_fields_differed() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("js_component:hero");
    store
        .save(
            &k,
            json!({"status": false, "label": "Hero", "source": "export default 1"}),
            &alice(),
            &repo,
        )
        .unwrap();

    let live = js_component(
        "hero",
        json!({"status": false, "label": "Hero", "source": "export default 1"}),
    );
    repo.put(&live).unwrap();

    let outcome = store.reconcile_config_fields(&live, &config_fields()).unwrap();
    assert_eq!(outcome, Some(SaveOutcome::Collapsed));
    assert!(store.get(&k).unwrap().is_none());
}

#[test]
fn config_sync_ignores_content_entities() {
    let repo = seeded_repo();
    let store = DraftStore::open_in_memory().unwrap();
    let k = key("node:1:en");
    store.save(&k, json!({"title": "a"}), &alice(), &repo).unwrap();

    let live = common::node("1", json!({"title": "b", "status": true}));
    let outcome = store.reconcile_config_fields(&live, &config_fields()).unwrap();
    assert_eq!(outcome, None);
    assert_eq!(store.get(&k).unwrap().unwrap().snapshot, json!({"title": "a"}));
}

#[test]
fn config_sync_without_draft_is_noop() {
    let store = DraftStore::open_in_memory().unwrap();
    let live = js_component("hero", json!({"status": false}));
    assert_eq!(store.reconcile_config_fields(&live, &config_fields()).unwrap(), None);
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn drafts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drafts.db");
    let repo = seeded_repo();
    let k = key("node:1:en");

    {
        let store = DraftStore::open(&path).unwrap();
        store.save(&k, json!({"title": "kept"}), &alice(), &repo).unwrap();
    }

    let store = DraftStore::open(&path).unwrap();
    let record = store.get(&k).unwrap().unwrap();
    assert_eq!(record.snapshot, json!({"title": "kept"}));
    assert_eq!(record.owner, alice());
}
