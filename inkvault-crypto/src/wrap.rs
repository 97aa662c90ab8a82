//! Wrapping document keys under the master key.
//!
//! A wrapped key is an ordinary AEAD payload whose plaintext is the 32 raw
//! key bytes: `base64(nonce[12] || encrypted key[32] || tag[16])`.

use crate::cipher::{self, EncryptedPayload, NONCE_SIZE, TAG_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{DocumentKey, KEY_SIZE, MasterKey, SecretKey};
use zeroize::Zeroize;

/// Encoded length of a wrapped key before base64.
pub const WRAPPED_KEY_SIZE: usize = NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// A document key encrypted under a master key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedDocumentKey(EncryptedPayload);

impl WrappedDocumentKey {
    /// The underlying AEAD payload.
    pub fn as_payload(&self) -> &EncryptedPayload {
        &self.0
    }

    /// Encodes to base64 for storage/transmission.
    pub fn to_base64(&self) -> String {
        self.0.to_base64()
    }

    /// Decodes from base64, checking the exact wrapped-key length.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let payload = EncryptedPayload::from_base64(encoded)?;
        if payload.len() != WRAPPED_KEY_SIZE {
            return Err(CryptoError::MalformedWireFormat(format!(
                "wrapped key must be {WRAPPED_KEY_SIZE} bytes, got {}",
                payload.len()
            )));
        }
        Ok(Self(payload))
    }
}

/// Encrypts a document key's raw bytes under the master key.
pub fn wrap_document_key(
    document_key: &DocumentKey,
    master: &MasterKey,
) -> CryptoResult<WrappedDocumentKey> {
    let payload = cipher::encrypt(master.key(), document_key.as_bytes())?;
    Ok(WrappedDocumentKey(payload))
}

/// Decrypts a wrapped document key.
///
/// Any failure, including a wrong master key, surfaces as
/// [`CryptoError::KeyUnwrapFailed`].
pub fn unwrap_document_key(
    wrapped: &WrappedDocumentKey,
    master: &MasterKey,
) -> CryptoResult<DocumentKey> {
    let mut raw = cipher::decrypt(master.key(), &wrapped.0)
        .map_err(|e| CryptoError::KeyUnwrapFailed(Box::new(e)))?;

    let key = SecretKey::from_slice(&raw).map_err(|e| CryptoError::KeyUnwrapFailed(Box::new(e)));
    raw.zeroize();
    key
}
