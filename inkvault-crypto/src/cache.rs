//! Session-scoped cache of unwrapped document keys.
//!
//! Search and backlink scans touch every document in a workspace; the cache
//! keeps each document key unwrapped at most once per session. Cloning the
//! cache shares the same underlying map.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DocumentKey, MasterKey};
use crate::wrap::{WrappedDocumentKey, unwrap_document_key};
use inkvault_types::DocumentId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Counters describing cache effectiveness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache by [`DocumentKeyCache::get_or_unwrap`].
    pub hits: u64,
    /// Unwrap operations actually performed.
    pub unwraps: u64,
}

/// One document's entry. Its mutex serializes the unwrap for that document
/// only, so lookups of other documents never wait behind it.
type Slot = Arc<Mutex<Option<DocumentKey>>>;

#[derive(Default)]
struct CacheInner {
    slots: RwLock<HashMap<DocumentId, Slot>>,
    hits: AtomicU64,
    unwraps: AtomicU64,
}

/// In-memory map from document ID to its unwrapped key.
#[derive(Clone, Default)]
pub struct DocumentKeyCache {
    inner: Arc<CacheInner>,
}

impl DocumentKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &DocumentId) -> Option<Slot> {
        self.inner
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn slot_or_insert(&self, id: &DocumentId) -> Slot {
        if let Some(slot) = self.slot(id) {
            return slot;
        }
        let mut slots = self
            .inner
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id.clone()).or_default())
    }

    /// Returns a cloned key for a document, if cached.
    pub fn get(&self, id: &DocumentId) -> Option<DocumentKey> {
        let slot = self.slot(id)?;
        let key = slot.lock().unwrap_or_else(PoisonError::into_inner).clone();
        key
    }

    /// Caches a key. A later put for the same document wins.
    pub fn put(&self, id: DocumentId, key: DocumentKey) {
        let slot = self.slot_or_insert(&id);
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
    }

    /// Removes a document's key (e.g. after the document is deleted).
    pub fn remove(&self, id: &DocumentId) -> Option<DocumentKey> {
        let slot = self
            .inner
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)?;
        let key = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        key
    }

    /// Returns the cached key or unwraps `wrapped` with the master key.
    ///
    /// Concurrent callers asking for the same document perform a single
    /// unwrap between them; the map itself is only locked to find the
    /// document's slot.
    pub fn get_or_unwrap(
        &self,
        id: &DocumentId,
        wrapped: &str,
        master: &MasterKey,
    ) -> CryptoResult<DocumentKey> {
        let slot = self.slot_or_insert(id);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = entry.as_ref() {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(key.clone());
        }

        if wrapped.trim().is_empty() {
            return Err(CryptoError::KeyNotFound(id.to_string()));
        }

        let wrapped = WrappedDocumentKey::from_base64(wrapped)?;
        let key = unwrap_document_key(&wrapped, master)?;
        self.inner.unwraps.fetch_add(1, Ordering::Relaxed);
        debug!(document_id = %id, "Unwrapped document key");

        *entry = Some(key.clone());
        Ok(key)
    }

    /// Returns the cached key or [`CryptoError::KeyNotFound`].
    pub fn require(&self, id: &DocumentId) -> CryptoResult<DocumentKey> {
        self.get(id)
            .ok_or_else(|| CryptoError::KeyNotFound(id.to_string()))
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached key. Called on logout/lock.
    ///
    /// Waits for unwraps in flight and discards their keys too.
    pub fn clear(&self) {
        let mut slots = self
            .inner
            .slots
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let dropped = slots.len();
        for slot in slots.values() {
            slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        }
        slots.clear();
        debug!(dropped, "Cleared document key cache");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            unwraps: self.inner.unwraps.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for DocumentKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentKeyCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
