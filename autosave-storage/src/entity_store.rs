//! SQLite-backed live entity store.

use crate::error::{StorageError, StorageResult};
use autosave_model::{Entity, EntityKind, EntityRepository, RepositoryError, RepositoryResult};
use autosave_types::ItemKey;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Live entities keyed by their item key.
#[derive(Clone)]
pub struct EntityStore {
    conn: Arc<Mutex<Connection>>,
}

impl EntityStore {
    /// Opens (or creates) an entity store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::from_connection(crate::open_sqlite(path)?)
    }

    /// Opens an in-memory entity store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS entities (
                item_key TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                langcode TEXT,
                kind TEXT NOT NULL,
                label TEXT NOT NULL,
                data TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Lock)
    }

    /// Inserts or replaces a live entity.
    pub fn put(&self, entity: &Entity) -> StorageResult<()> {
        let key = entity.key()?;
        let data = serde_json::to_string(&entity.data)?;
        let kind = match entity.kind {
            EntityKind::Content => "content",
            EntityKind::Config => "config",
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO entities (item_key, entity_type, entity_id, langcode, kind, label, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                key.as_str(),
                entity.entity_type,
                entity.id,
                entity.langcode,
                kind,
                entity.label,
                data,
            ],
        )?;
        Ok(())
    }

    /// Fetches a live entity.
    pub fn get(&self, key: &ItemKey) -> StorageResult<Option<Entity>> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT entity_type, entity_id, langcode, kind, label, data FROM entities WHERE item_key = ?1",
                params![key.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?
        };

        let Some((entity_type, id, langcode, kind, label, data)) = row else {
            return Ok(None);
        };
        let kind = match kind.as_str() {
            "content" => EntityKind::Content,
            "config" => EntityKind::Config,
            other => return Err(StorageError::InvalidData(format!("unknown entity kind {other:?}"))),
        };
        Ok(Some(Entity {
            entity_type,
            id,
            langcode,
            kind,
            label,
            data: serde_json::from_str(&data)?,
        }))
    }
}

impl EntityRepository for EntityStore {
    fn load(&self, key: &ItemKey) -> RepositoryResult<Option<Entity>> {
        self.get(key).map_err(into_repository_error)
    }

    fn save(&self, entity: &Entity) -> RepositoryResult<()> {
        self.put(entity).map_err(into_repository_error)
    }
}

fn into_repository_error(e: StorageError) -> RepositoryError {
    match e {
        StorageError::Serialization(e) => RepositoryError::Serialization(e),
        StorageError::NotFound(key) => RepositoryError::NotFound(key),
        other => RepositoryError::Backend(other.to_string()),
    }
}
