//! Document body codec: AEAD + base64 wire format, plus concurrent batch
//! decoding for listing and indexing.

use crate::cipher::{self, EncryptedPayload};
use crate::error::{CryptoError, CryptoResult};
use crate::key::DocumentKey;
use inkvault_types::DocumentId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// Encrypts `plaintext` and returns `base64(nonce || ciphertext || tag)`.
pub fn encode(plaintext: &[u8], key: &DocumentKey) -> CryptoResult<String> {
    Ok(cipher::encrypt(key, plaintext)?.to_base64())
}

/// Serializes `value` as JSON, then encodes it.
pub fn encode_json<T: Serialize>(value: &T, key: &DocumentKey) -> CryptoResult<String> {
    let json = serde_json::to_vec(value)?;
    encode(&json, key)
}

/// Decodes and decrypts a base64 payload.
pub fn decode(encoded: &str, key: &DocumentKey) -> CryptoResult<Vec<u8>> {
    let payload = EncryptedPayload::from_base64(encoded)?;
    cipher::decrypt(key, &payload)
}

/// Decodes a payload and parses the plaintext as JSON.
pub fn decode_json<T: DeserializeOwned>(encoded: &str, key: &DocumentKey) -> CryptoResult<T> {
    let plaintext = decode(encoded, key)?;
    Ok(serde_json::from_slice(&plaintext)?)
}

/// Resolves the content key for a document during batch decoding.
pub trait KeyLookup: Send + Sync + 'static {
    fn document_key(&self, id: &DocumentId) -> CryptoResult<DocumentKey>;
}

impl<F> KeyLookup for F
where
    F: Fn(&DocumentId) -> CryptoResult<DocumentKey> + Send + Sync + 'static,
{
    fn document_key(&self, id: &DocumentId) -> CryptoResult<DocumentKey> {
        self(id)
    }
}

/// One encoded document body to decode.
#[derive(Clone, Debug)]
pub struct BatchItem {
    pub id: DocumentId,
    pub encoded: String,
}

/// Per-document outcome of [`decode_batch`].
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: DocumentId,
    pub result: CryptoResult<Vec<u8>>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Decrypts every item concurrently.
///
/// Items are independent: one failure (bad key, corrupted payload) is
/// reported for that item only and never aborts the rest. Outcomes are
/// returned in input order.
pub async fn decode_batch<L: KeyLookup>(
    items: Vec<BatchItem>,
    lookup: Arc<L>,
) -> Vec<BatchOutcome> {
    let (ids, handles): (Vec<_>, Vec<_>) = items
        .into_iter()
        .map(|item| {
            let lookup = Arc::clone(&lookup);
            let id = item.id.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let key = lookup.document_key(&item.id)?;
                decode(&item.encoded, &key)
            });
            (id, handle)
        })
        .unzip();

    let joined = futures::future::join_all(handles).await;

    ids.into_iter()
        .zip(joined)
        .map(|(id, joined)| {
            let result = joined.unwrap_or_else(|e| Err(CryptoError::Task(e.to_string())));
            if let Err(e) = &result {
                warn!(document_id = %id, error = %e, "Failed to decode document body");
            }
            BatchOutcome { id, result }
        })
        .collect()
}
