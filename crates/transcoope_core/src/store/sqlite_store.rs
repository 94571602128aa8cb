//! SQLite-backed key-value backend.
//!
//! # Invariants
//! - Entries live in `kv_entries`, one row per namespaced key.
//! - Writes are upserts; `updated_at` tracks the last write in epoch ms.

use super::{KvBackend, StoreError};
use crate::db::{open_db, open_db_in_memory, DbResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a store file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvBackend for SqliteKvStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|source| StoreError::Sqlite {
                op: "get_item",
                source,
            })?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(|source| StoreError::Sqlite {
                op: "set_item",
                source,
            })?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])
            .map_err(|source| StoreError::Sqlite {
                op: "remove_item",
                source,
            })?;
        Ok(())
    }

    fn probe(&self) -> Result<(), StoreError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|_| ())
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}
