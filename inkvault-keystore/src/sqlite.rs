//! SQLite-backed key store.
//!
//! Uses its own small database file so key material is isolated from any
//! document cache. Each operation runs in a single transaction.

use crate::error::KeyStoreResult;
use crate::store::{KeyRecord, KeyStore};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Persistent key store backed by SQLite.
pub struct SqliteKeyStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyStore {
    /// Opens (or creates) a key store at the given path.
    pub fn open(path: &Path) -> KeyStoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory key store (for testing).
    pub fn open_in_memory() -> KeyStoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> KeyStoreResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS key_records (
                id TEXT PRIMARY KEY,
                key BLOB NOT NULL,
                salt BLOB NOT NULL,
                created_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// When the record under `id` was last written (RFC 3339).
    pub fn created_at(&self, id: &str) -> KeyStoreResult<Option<String>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let created = conn
            .query_row(
                "SELECT created_at FROM key_records WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(created)
    }
}

impl KeyStore for SqliteKeyStore {
    fn load(&self, id: &str) -> KeyStoreResult<Option<KeyRecord>> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;
        let record = tx
            .query_row(
                "SELECT key, salt FROM key_records WHERE id = ?1",
                params![id],
                |row| {
                    Ok(KeyRecord {
                        key: row.get(0)?,
                        salt: row.get(1)?,
                    })
                },
            )
            .optional()?;
        tx.commit()?;
        Ok(record)
    }

    fn save(&self, id: &str, record: &KeyRecord) -> KeyStoreResult<()> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO key_records (id, key, salt, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                key = excluded.key,
                salt = excluded.salt,
                created_at = excluded.created_at",
            params![id, record.key, record.salt, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, id: &str) -> KeyStoreResult<bool> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM key_records WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
