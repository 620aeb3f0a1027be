#![allow(dead_code)]

use autosave_model::{Entity, EntityKind, EntityRepository, RepositoryError, RepositoryResult};
use autosave_publish::{PublishConfig, Publisher};
use autosave_storage::{DraftStore, EntityStore, SaveOutcome};
use autosave_types::{ItemKey, Principal};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub fn key(s: &str) -> ItemKey {
    s.parse().unwrap()
}

pub fn alice() -> Principal {
    Principal::new("1", "alice")
}

pub fn bob() -> Principal {
    Principal::new("2", "bob")
}

pub fn node(id: &str, title: &str) -> Entity {
    Entity {
        entity_type: "node".into(),
        id: id.into(),
        langcode: Some("en".into()),
        kind: EntityKind::Content,
        label: title.into(),
        data: json!({"title": title, "body": "live"}),
    }
}

pub fn config(entity_type: &str, id: &str, data: Value) -> Entity {
    Entity {
        entity_type: entity_type.into(),
        id: id.into(),
        langcode: None,
        kind: EntityKind::Config,
        label: id.to_string(),
        data,
    }
}

/// Entity store seeded with three nodes, a code component and the global
/// asset library.
pub fn seeded_repo() -> EntityStore {
    let repo = EntityStore::open_in_memory().unwrap();
    for (id, title) in [("1", "Home"), ("2", "About"), ("3", "Contact")] {
        repo.put(&node(id, title)).unwrap();
    }
    repo.put(&config(
        "js_component",
        "hero",
        json!({"status": true, "label": "Hero", "source": "export default 1"}),
    ))
    .unwrap();
    repo.put(&config(
        "asset_library",
        "global",
        json!({"label": "Global", "css": "", "js": ""}),
    ))
    .unwrap();
    repo
}

/// A publisher over a seeded repository, plus handles to inspect both stores.
pub struct Harness {
    pub repo: EntityStore,
    pub drafts: DraftStore,
    pub publisher: Publisher,
}

impl Harness {
    pub fn new() -> Self {
        let repo = seeded_repo();
        Self::with_repository(repo.clone(), Arc::new(repo))
    }

    /// Builds the publisher over `publish_repo`, which must wrap `repo`.
    pub fn with_repository(repo: EntityStore, publish_repo: Arc<dyn EntityRepository>) -> Self {
        let drafts = DraftStore::open_in_memory().unwrap();
        let publisher = Publisher::new(drafts.clone(), publish_repo, PublishConfig::default());
        Self {
            repo,
            drafts,
            publisher,
        }
    }

    /// Reconfigures the publisher, e.g. with a validator or access checker.
    pub fn configure(mut self, f: impl FnOnce(Publisher) -> Publisher) -> Self {
        self.publisher = f(self.publisher);
        self
    }

    /// Stages a draft owned by alice and returns its hash.
    pub fn stage(&self, k: &str, snapshot: Value) -> String {
        match self.drafts.save(&key(k), snapshot, &alice(), &self.repo).unwrap() {
            SaveOutcome::Stored(hash) => hash,
            SaveOutcome::Collapsed => panic!("{k} snapshot matches live data"),
        }
    }

    pub fn live(&self, k: &str) -> Entity {
        self.repo.get(&key(k)).unwrap().unwrap()
    }

    pub fn has_draft(&self, k: &str) -> bool {
        self.drafts.get(&key(k)).unwrap().is_some()
    }
}

/// Repository that fails writes of one key and records the order of
/// successful writes.
pub struct FlakyRepository {
    pub inner: EntityStore,
    pub fail_on: Option<ItemKey>,
    pub writes: Mutex<Vec<ItemKey>>,
}

impl FlakyRepository {
    pub fn new(inner: EntityStore) -> Self {
        Self {
            inner,
            fail_on: None,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(inner: EntityStore, k: &str) -> Self {
        Self {
            fail_on: Some(key(k)),
            ..Self::new(inner)
        }
    }

    pub fn writes(&self) -> Vec<ItemKey> {
        self.writes.lock().unwrap().clone()
    }
}

impl EntityRepository for FlakyRepository {
    fn load(&self, k: &ItemKey) -> RepositoryResult<Option<Entity>> {
        self.inner.load(k)
    }

    fn save(&self, entity: &Entity) -> RepositoryResult<()> {
        let k = entity.key().map_err(|e| RepositoryError::Backend(e.to_string()))?;
        if self.fail_on.as_ref() == Some(&k) {
            return Err(RepositoryError::Backend("disk full".into()));
        }
        self.inner.save(entity)?;
        self.writes.lock().unwrap().push(k);
        Ok(())
    }

    /// A node's `/parent` member names the node it is placed under.
    fn structural_parents(&self, entity: &Entity) -> Vec<ItemKey> {
        entity
            .get_str("/parent")
            .and_then(|p| p.parse().ok())
            .into_iter()
            .collect()
    }
}
