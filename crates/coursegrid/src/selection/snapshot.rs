//! Snapshot persistence for the selection store.
//!
//! The store talks to persistence through the `SnapshotStore` port; expiry is
//! enforced by the reader at restore time, never by the storage medium. The
//! sqlite implementation keeps a single row that each save replaces.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_snapshots.sql");

/// The serialized form of the selection store: when it was saved, and the
/// term → chosen-course-id lists. Courses are rehydrated through the catalog
/// on restore; full records are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub saved_at: DateTime<Utc>,
    pub terms: BTreeMap<i32, Vec<String>>,
}

/// Errors from snapshot storage. All of them are survivable: writes are
/// best-effort and a failed read falls back to a default store.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Persistence port for selection snapshots.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError>;
    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        (**self).save(snapshot)
    }
}

/// Sqlite-backed snapshot storage.
pub struct SqliteSnapshotStore {
    db: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Opens (or creates) the snapshot database at `db_path` and initializes
    /// the schema.
    pub fn open(db_path: &str) -> Result<Self, SnapshotError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, SnapshotError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let db = self.db.lock().unwrap();
        let row: Option<(String, DateTime<Utc>)> = db
            .query_row(
                "SELECT payload, saved_at FROM snapshots WHERE snapshot_id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((payload, saved_at)) => {
                let terms: BTreeMap<i32, Vec<String>> = serde_json::from_str(&payload)?;
                Ok(Some(Snapshot { saved_at, terms }))
            }
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let payload = serde_json::to_string(&snapshot.terms)?;
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR REPLACE INTO snapshots (snapshot_id, payload, saved_at)
             VALUES (1, ?1, ?2)",
            (payload, snapshot.saved_at),
        )?;
        Ok(())
    }
}

/// In-memory snapshot storage: the fallback when sqlite is unavailable, and
/// the test double.
#[derive(Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<Snapshot>>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        *self.slot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}
