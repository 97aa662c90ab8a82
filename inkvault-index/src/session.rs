//! Session key lifecycle and the document open/create/update flow.

use crate::error::{IndexError, IndexResult};
use inkvault_crypto::{
    BatchItem, CryptoError, DocumentKey, DocumentKeyCache, DocumentMetadata, EncryptedDocument,
    MasterKey, codec, decode_batch, seal_document,
};
use inkvault_keystore::MasterKeyService;
use inkvault_model::DocumentBody;
use inkvault_types::DocumentId;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// A document that could not be decrypted or parsed during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub id: DocumentId,
    pub title: String,
    pub reason: String,
}

/// A document together with its decrypted body.
#[derive(Debug, Clone)]
pub struct OpenedDocument {
    pub document: EncryptedDocument,
    pub body: DocumentBody,
}

/// Owns the unlocked master key and the document key cache for one user
/// session.
///
/// Locking drops the master key and every cached document key; decrypts
/// attempted afterwards fail with [`IndexError::Locked`].
#[derive(Debug, Default)]
pub struct WorkspaceSession {
    master: RwLock<Option<Arc<MasterKey>>>,
    cache: DocumentKeyCache,
}

impl WorkspaceSession {
    /// A locked session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already unlocked with `master`.
    pub fn with_master_key(master: MasterKey) -> Self {
        let session = Self::new();
        session.set_master(Some(Arc::new(master)));
        session
    }

    /// Loads the stored master key.
    ///
    /// Unavailable storage, a corrupt record or a missing key all mean the
    /// workspace cannot be unlocked; none of them are retried.
    pub async fn unlock(&self, service: &MasterKeyService) -> IndexResult<()> {
        let service = service.clone();
        let retrieved = tokio::task::spawn_blocking(move || service.retrieve())
            .await
            .map_err(|e| IndexError::Task(e.to_string()))?;

        let master = match retrieved {
            Ok(Some(master)) => master,
            Ok(None) => {
                return Err(IndexError::CannotUnlock("no master key stored".to_string()));
            }
            Err(e) => {
                warn!(error = %e, "Master key retrieval failed");
                return Err(IndexError::CannotUnlock(e.to_string()));
            }
        };

        self.set_master(Some(Arc::new(master)));
        info!("Workspace unlocked");
        Ok(())
    }

    pub fn unlock_with_master_key(&self, master: MasterKey) {
        self.set_master(Some(Arc::new(master)));
        info!("Workspace unlocked");
    }

    /// Drops the master key and clears the document key cache.
    pub fn lock(&self) {
        self.set_master(None);
        info!("Workspace locked");
    }

    pub fn is_unlocked(&self) -> bool {
        self.master
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn cache(&self) -> &DocumentKeyCache {
        &self.cache
    }

    /// Replaces the master key. Cached document keys belong to the previous
    /// one, so the cache is emptied before the new key becomes visible.
    fn set_master(&self, master: Option<Arc<MasterKey>>) {
        let mut current = self.master.write().unwrap_or_else(PoisonError::into_inner);
        self.cache.clear();
        *current = master;
    }

    fn master_key(&self) -> IndexResult<Arc<MasterKey>> {
        self.master
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(IndexError::Locked)
    }

    /// The document's key, from the cache or unwrapped once and cached.
    pub fn document_key(&self, document: &EncryptedDocument) -> IndexResult<DocumentKey> {
        let master = self.master_key()?;
        Ok(self
            .cache
            .get_or_unwrap(&document.id, &document.encrypted_document_key, &master)?)
    }

    /// Decrypts and parses one document body.
    pub fn open_document(&self, document: &EncryptedDocument) -> IndexResult<DocumentBody> {
        let key = self.document_key(document)?;
        let plaintext = codec::decode(&document.encrypted_content, &key)?;
        Ok(DocumentBody::from_json(&plaintext)?)
    }

    /// Encrypts a new document under a fresh document key and caches the key.
    pub fn create_document(
        &self,
        metadata: DocumentMetadata,
        body: &DocumentBody,
    ) -> IndexResult<EncryptedDocument> {
        let master = self.master_key()?;
        let plaintext = body.to_json()?;
        let (document, key) = seal_document(DocumentId::new(), metadata, &plaintext, &master)?;
        self.cache.put(document.id.clone(), key);
        debug!(document_id = %document.id, "Created document");
        Ok(document)
    }

    /// Re-encrypts a document's body under its existing document key.
    pub fn update_document(
        &self,
        document: &EncryptedDocument,
        body: &DocumentBody,
    ) -> IndexResult<EncryptedDocument> {
        let key = self.document_key(document)?;
        let plaintext = body.to_json()?;
        Ok(document.with_content(&plaintext, &key)?)
    }

    /// Decrypts many documents concurrently.
    ///
    /// Per-document failures are logged and returned as skipped entries;
    /// only a locked session fails the whole call.
    pub async fn open_all(
        &self,
        documents: Vec<EncryptedDocument>,
    ) -> IndexResult<(Vec<OpenedDocument>, Vec<SkippedDocument>)> {
        let master = self.master_key()?;
        let scan_master = Arc::clone(&master);

        let wrapped: HashMap<DocumentId, String> = documents
            .iter()
            .map(|d| (d.id.clone(), d.encrypted_document_key.clone()))
            .collect();
        let cache = self.cache.clone();
        let lookup = move |id: &DocumentId| -> Result<DocumentKey, CryptoError> {
            let wrapped = wrapped
                .get(id)
                .ok_or_else(|| CryptoError::KeyNotFound(id.to_string()))?;
            cache.get_or_unwrap(id, wrapped, &master)
        };

        let items = documents
            .iter()
            .map(|d| BatchItem {
                id: d.id.clone(),
                encoded: d.encrypted_content.clone(),
            })
            .collect();
        let outcomes = decode_batch(items, Arc::new(lookup)).await;

        // Keys unwrapped by a scan that raced a lock() or a key change must
        // not outlive it.
        let unchanged = self
            .master_key()
            .is_ok_and(|current| Arc::ptr_eq(&current, &scan_master));
        if !unchanged {
            self.cache.clear();
            return Err(IndexError::Locked);
        }

        let mut opened = Vec::with_capacity(documents.len());
        let mut skipped = Vec::new();
        for (document, outcome) in documents.into_iter().zip(outcomes) {
            let parsed = outcome
                .result
                .map_err(IndexError::from)
                .and_then(|plaintext| Ok(DocumentBody::from_json(&plaintext)?));
            match parsed {
                Ok(body) => opened.push(OpenedDocument { document, body }),
                Err(e) => {
                    if matches!(e, IndexError::Model(_)) {
                        warn!(
                            document_id = %document.id,
                            error = %e,
                            "Skipping unparseable document"
                        );
                    }
                    skipped.push(SkippedDocument {
                        id: document.id,
                        title: document.metadata.title,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok((opened, skipped))
    }
}
