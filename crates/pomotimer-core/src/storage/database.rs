//! SQLite-backed key-value store.
//!
//! Holds the persisted timer snapshot and settings in a single `kv` table
//! whose rows may carry an expiry timestamp.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, KeyValueStore};
use crate::error::{Result, StorageError};

/// SQLite database for engine state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data dir>/pomotimer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomotimer.db"))
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                expires_at INTEGER
            );",
        )?;
        Ok(())
    }

    /// Drop rows whose expiry has passed. Returns how many were removed.
    pub fn purge_expired(&self, now_ms: i64) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM kv WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![now_ms],
        )?;
        Ok(removed)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str, now_ms: i64) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv
                 WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                params![key, now_ms],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, expires_at_ms: Option<i64>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, value, expires_at_ms],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
