//! SQLite storage layer for the auto-save draft overlay.
//!
//! Provides two stores:
//!
//! - [`DraftStore`]: the keyed table of divergent drafts. A record exists for
//!   a key only while its snapshot differs from the live entity.
//! - [`EntityStore`]: a SQLite-backed [`EntityRepository`] holding live
//!   entities, for hosts without a repository of their own and for tests.
//!
//! Each record is written by a single statement, so readers never observe a
//! half-written draft. Writers share one connection behind a mutex.
//!
//! [`EntityRepository`]: autosave_model::EntityRepository

mod draft_store;
mod entity_store;
mod error;

pub use draft_store::{DraftFilter, DraftRecord, DraftStore, SaveOutcome, CONFIG_LIVE_FIELDS};
pub use entity_store::EntityStore;
pub use error::{StorageError, StorageResult};

use std::path::Path;
use std::time::Duration;

/// Open a SQLite connection for a file-backed store.
///
/// Enables WAL so readers are not blocked while a draft is being written, and
/// waits on a busy database instead of failing immediately.
pub fn open_sqlite(path: &Path) -> StorageResult<rusqlite::Connection> {
    let conn = rusqlite::Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!("opened {} (journal_mode={})", path.display(), mode);
    Ok(conn)
}
