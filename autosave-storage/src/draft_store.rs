//! The keyed table of divergent drafts.
//!
//! `save` is the only write path that creates records: it compares the new
//! snapshot against the live entity and either upserts a record or deletes
//! the existing one. Concurrent saves on one key are last-writer-wins.

use crate::error::{StorageError, StorageResult};
use autosave_model::{content_hash, Entity, EntityKind, EntityRepository};
use autosave_types::{ItemKey, Principal, PrincipalId, Timestamp};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Config-entity fields that may change on the live object without
/// invalidating a pending draft.
pub const CONFIG_LIVE_FIELDS: [&str; 2] = ["status", "label"];

const SELECT_COLUMNS: &str =
    "item_key, label, snapshot, data_hash, owner, updated FROM drafts";

/// A staged, not-yet-published snapshot of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub key: ItemKey,
    /// Label of the entity as the draft would publish it.
    pub label: String,
    pub snapshot: serde_json::Value,
    pub data_hash: String,
    pub owner: Principal,
    pub updated: Timestamp,
}

/// Result of a [`DraftStore::save`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot diverges from the live entity and was stored under this hash.
    Stored(String),
    /// The snapshot matches the live entity; any existing draft was removed.
    Collapsed,
}

/// Narrows a listing. Access filtering is not done here; callers post-filter.
#[derive(Debug, Clone, Default)]
pub struct DraftFilter {
    pub owner: Option<PrincipalId>,
    pub entity_type: Option<String>,
}

impl DraftFilter {
    /// Lists every draft.
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn owned_by(mut self, owner: PrincipalId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn of_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }
}

/// Persistent draft table backed by SQLite.
#[derive(Clone)]
pub struct DraftStore {
    conn: Arc<Mutex<Connection>>,
}

impl DraftStore {
    /// Opens (or creates) a draft store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::from_connection(crate::open_sqlite(path)?)
    }

    /// Opens an in-memory draft store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS drafts (
                item_key TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                langcode TEXT,
                label TEXT NOT NULL,
                snapshot TEXT NOT NULL,
                data_hash TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                owner TEXT NOT NULL,
                updated INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_drafts_owner ON drafts(owner_id);
            CREATE INDEX IF NOT EXISTS idx_drafts_entity ON drafts(entity_type, entity_id);
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Lock)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Stages `snapshot` as the draft for `key`.
    ///
    /// Loads the live entity through `repo`. When the snapshot hashes equal to
    /// the live data the existing draft (if any) is deleted instead.
    pub fn save(
        &self,
        key: &ItemKey,
        snapshot: serde_json::Value,
        owner: &Principal,
        repo: &dyn EntityRepository,
    ) -> StorageResult<SaveOutcome> {
        let live = repo
            .load(key)?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        let data_hash = content_hash(&snapshot);
        if data_hash == content_hash(&live.data) {
            let removed = self.delete(key)?;
            debug!("draft {} matches live entity (removed={})", key, removed);
            return Ok(SaveOutcome::Collapsed);
        }

        let record = DraftRecord {
            key: key.clone(),
            label: live.with_snapshot(&snapshot).label,
            snapshot,
            data_hash: data_hash.clone(),
            owner: owner.clone(),
            updated: Timestamp::now(),
        };
        self.upsert(&record)?;
        debug!("stored draft {} (hash={}, owner={})", key, data_hash, owner.id);
        Ok(SaveOutcome::Stored(data_hash))
    }

    /// Carries live-only config field changes into the pending draft.
    ///
    /// Called after `live` was saved directly (e.g. a component was enabled or
    /// renamed). Each of `fields` is copied from the live data into the draft
    /// snapshot, or removed from it when the live entity lacks it. The draft is
    /// dropped if it then matches the live entity. Content entities and keys
    /// without a draft are left alone and return `None`.
    pub fn reconcile_config_fields(
        &self,
        live: &Entity,
        fields: &[String],
    ) -> StorageResult<Option<SaveOutcome>> {
        if live.kind != EntityKind::Config {
            return Ok(None);
        }
        let key = live.key()?;
        let Some(mut record) = self.get(&key)? else {
            return Ok(None);
        };

        if let Some(draft) = record.snapshot.as_object_mut() {
            for field in fields {
                match live.data.get(field) {
                    Some(value) => {
                        draft.insert(field.clone(), value.clone());
                    }
                    None => {
                        draft.remove(field);
                    }
                }
            }
        }

        let data_hash = content_hash(&record.snapshot);
        if data_hash == content_hash(&live.data) {
            self.delete(&key)?;
            debug!("draft {} collapsed after config field sync", key);
            return Ok(Some(SaveOutcome::Collapsed));
        }

        record.label = live.with_snapshot(&record.snapshot).label;
        record.data_hash = data_hash.clone();
        self.upsert(&record)?;
        debug!("patched config fields of draft {} (hash={})", key, data_hash);
        Ok(Some(SaveOutcome::Stored(data_hash)))
    }

    fn upsert(&self, record: &DraftRecord) -> StorageResult<()> {
        let snapshot = serde_json::to_string(&record.snapshot)?;
        let owner = serde_json::to_string(&record.owner)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO drafts (item_key, entity_type, entity_id, langcode, label, snapshot, data_hash, owner_id, owner, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(item_key) DO UPDATE SET
                label = excluded.label,
                snapshot = excluded.snapshot,
                data_hash = excluded.data_hash,
                owner_id = excluded.owner_id,
                owner = excluded.owner,
                updated = excluded.updated",
            params![
                record.key.as_str(),
                record.key.entity_type(),
                record.key.entity_id(),
                record.key.langcode(),
                record.label,
                snapshot,
                record.data_hash,
                record.owner.id.as_str(),
                owner,
                record.updated.as_millis() as i64,
            ],
        )?;
        Ok(())
    }

    /// Deletes the draft for `key`. Returns whether one existed.
    pub fn delete(&self, key: &ItemKey) -> StorageResult<bool> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM drafts WHERE item_key = ?1", params![key.as_str()])?;
        Ok(n > 0)
    }

    /// Deletes the drafts of every translation of one entity.
    /// Returns the number of drafts removed.
    pub fn delete_entity(&self, entity_type: &str, entity_id: &str) -> StorageResult<usize> {
        let conn = self.lock()?;
        let n = conn.execute(
            "DELETE FROM drafts WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity_type, entity_id],
        )?;
        Ok(n)
    }

    /// Removes every draft. Called when the owning feature is torn down.
    pub fn clear(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM drafts", [])?;
        info!("cleared {} drafts", n);
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Returns the draft for `key`, or `None` when no divergent draft exists.
    pub fn get(&self, key: &ItemKey) -> StorageResult<Option<DraftRecord>> {
        let raw = {
            let conn = self.lock()?;
            conn.query_row(
                &format!("SELECT {SELECT_COLUMNS} WHERE item_key = ?1"),
                params![key.as_str()],
                RawDraft::from_row,
            )
            .optional()?
        };
        raw.map(RawDraft::into_record).transpose()
    }

    /// Lists drafts matching `filter`, ordered by key.
    pub fn list(&self, filter: &DraftFilter) -> StorageResult<Vec<DraftRecord>> {
        let mut clauses = Vec::new();
        let mut args: Vec<&str> = Vec::new();
        if let Some(owner) = &filter.owner {
            clauses.push("owner_id = ?");
            args.push(owner.as_str());
        }
        if let Some(entity_type) = &filter.entity_type {
            clauses.push("entity_type = ?");
            args.push(entity_type);
        }

        let mut sql = format!("SELECT {SELECT_COLUMNS}");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY item_key");

        let raws = {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args), RawDraft::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        raws.into_iter().map(RawDraft::into_record).collect()
    }

    /// Keys of every stored draft, ordered.
    pub fn keys(&self) -> StorageResult<Vec<ItemKey>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT item_key FROM drafts ORDER BY item_key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for raw in rows {
            keys.push(ItemKey::parse(&raw?)?);
        }
        Ok(keys)
    }

    /// Number of stored drafts.
    pub fn len(&self) -> StorageResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM drafts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Column values as read, before JSON decoding.
struct RawDraft {
    key: String,
    label: String,
    snapshot: String,
    data_hash: String,
    owner: String,
    updated: i64,
}

impl RawDraft {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            label: row.get(1)?,
            snapshot: row.get(2)?,
            data_hash: row.get(3)?,
            owner: row.get(4)?,
            updated: row.get(5)?,
        })
    }

    fn into_record(self) -> StorageResult<DraftRecord> {
        Ok(DraftRecord {
            key: ItemKey::parse(&self.key)?,
            label: self.label,
            snapshot: serde_json::from_str(&self.snapshot)?,
            data_hash: self.data_hash,
            owner: serde_json::from_str(&self.owner)?,
            updated: Timestamp::from_millis(self.updated.max(0) as u64),
        })
    }
}
