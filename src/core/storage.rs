//! Durable key-value substrate
//!
//! The engine persists each store as a serialized list under a single key.
//! The substrate is an opaque string-keyed blob store; the default backend
//! is an embedded redb database under the platform data directory, with an
//! in-memory implementation for tests and as a degraded-mode fallback.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use directories::ProjectDirs;
use redb::{Database, ReadableTable, TableDefinition};

use crate::shared::errors::{EngineError, EngineResult};

/// Key under which the history sequence is stored
pub const HISTORY_KEY: &str = "clipboardItems";
/// Key under which the pinned set is stored
pub const SAVED_KEY: &str = "savedClipboardItems";

/// Redb table holding all engine blobs, keyed by store name
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clipkeep_kv");

/// Opaque durable blob store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> EngineResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> EngineResult<()>;
}

/// Redb-backed store
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open the database at the default platform data directory.
    pub fn open_default() -> EngineResult<Self> {
        let proj_dirs = ProjectDirs::from("com", "clipkeep", "clipkeep")
            .ok_or_else(|| EngineError::Storage("Failed to get project directories".to_string()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Self::open(data_dir.join("clipkeep.redb"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let db = Database::create(path)
            .map_err(|e| EngineError::Storage(format!("Failed to open database: {}", e)))?;

        // Make sure the table exists so reads never race its creation
        let write_txn = db
            .begin_write()
            .map_err(|e| EngineError::Storage(format!("Failed to begin write: {}", e)))?;
        {
            let _table = write_txn
                .open_table(KV_TABLE)
                .map_err(|e| EngineError::Storage(format!("Failed to open table: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| EngineError::Storage(format!("Failed to commit: {}", e)))?;

        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> EngineResult<Option<Vec<u8>>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| EngineError::Storage(format!("Failed to begin read: {}", e)))?;

        let table = read_txn
            .open_table(KV_TABLE)
            .map_err(|e| EngineError::Storage(format!("Failed to open table: {}", e)))?;

        let value = table
            .get(key)
            .map_err(|e| EngineError::Storage(format!("Failed to read key: {}", e)))?;

        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> EngineResult<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| EngineError::Storage(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn
                .open_table(KV_TABLE)
                .map_err(|e| EngineError::Storage(format!("Failed to open table: {}", e)))?;
            table
                .insert(key, value)
                .map_err(|e| EngineError::Storage(format!("Failed to insert: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| EngineError::Storage(format!("Failed to commit: {}", e)))?;

        Ok(())
    }
}

/// In-memory store (tests, and fallback when the database cannot be opened)
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> EngineResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> EngineResult<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
