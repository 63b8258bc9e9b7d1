//! Local storage port.
//!
//! The session gate and the bookmark store never touch a concrete backend;
//! they receive an `Arc<dyn LocalStorage>` holding string values under
//! string keys. [`SqliteStorage`] persists to disk, [`MemoryStorage`] is the
//! in-process fake used by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::types::errors::StorageError;

/// Key holding the session token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Key holding the JSON-encoded bookmark array.
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// Synchronous string key/value storage.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Storage backed by the `local_storage` table.
pub struct SqliteStorage {
    db: Arc<Database>,
}

impl SqliteStorage {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl LocalStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.db.connection()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }
}
