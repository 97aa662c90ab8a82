//! Durable key-value storage for key records.

use crate::error::KeyStoreResult;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Raw persisted form of a master key: `{ key, salt }`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyRecord {
    pub key: Vec<u8>,
    pub salt: Vec<u8>,
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("key", &"[REDACTED]")
            .field("salt_len", &self.salt.len())
            .finish()
    }
}

/// Local key-value store holding key records by identifier.
///
/// Every call is one atomic read or write; implementations must never leave
/// a half-written record behind.
pub trait KeyStore: Send + Sync {
    /// Reads the record stored under `id`.
    fn load(&self, id: &str) -> KeyStoreResult<Option<KeyRecord>>;

    /// Writes (or replaces) the record stored under `id`.
    fn save(&self, id: &str, record: &KeyRecord) -> KeyStoreResult<()>;

    /// Deletes the record under `id`. Returns whether one existed.
    fn delete(&self, id: &str) -> KeyStoreResult<bool>;
}

/// Process-local store for tests and sessions that must not touch disk.
#[derive(Default)]
pub struct MemoryKeyStore {
    records: Mutex<HashMap<String, KeyRecord>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self, id: &str) -> KeyStoreResult<Option<KeyRecord>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(id).cloned())
    }

    fn save(&self, id: &str, record: &KeyRecord) -> KeyStoreResult<()> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.insert(id.to_string(), record.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> KeyStoreResult<bool> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.remove(id).is_some())
    }
}
