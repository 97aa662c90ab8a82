//! Document-level encryption.
//!
//! Documents use a two-tier key architecture:
//!
//! 1. Master Key: random, or derived from the user's password with PBKDF2
//! 2. Document Key: random key per document, wrapped by the master key
//!
//! Changing the master key only rewraps document keys; bodies are never
//! re-encrypted. Document keys are not rotated after creation.

use crate::codec;
use crate::error::CryptoResult;
use crate::key::{DocumentKey, MasterKey, generate_document_key};
use crate::wrap::{WrappedDocumentKey, unwrap_document_key, wrap_document_key};
use inkvault_types::DocumentId;
use serde::{Deserialize, Serialize};

/// Plaintext metadata stored next to the encrypted body.
///
/// None of these fields are confidential: the server reads them in the clear.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl DocumentMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A document as exchanged with the storage server.
///
/// Both encrypted fields stay base64 strings until decoded, so one corrupted
/// document cannot fail the parse of a whole listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedDocument {
    pub id: DocumentId,
    /// `base64(nonce || ciphertext || tag)` under the document key.
    pub encrypted_content: String,
    /// `base64(nonce || wrapped key || tag)` under the master key.
    pub encrypted_document_key: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl EncryptedDocument {
    /// Returns a copy whose body is `plaintext` encrypted under the same
    /// document key. The wrapped key is carried over unchanged.
    pub fn with_content(&self, plaintext: &[u8], key: &DocumentKey) -> CryptoResult<Self> {
        Ok(Self {
            encrypted_content: codec::encode(plaintext, key)?,
            ..self.clone()
        })
    }
}

/// Encrypts a new document under a fresh document key.
///
/// Returns the document together with its key so the caller can cache it.
pub fn seal_document(
    id: DocumentId,
    metadata: DocumentMetadata,
    plaintext: &[u8],
    master: &MasterKey,
) -> CryptoResult<(EncryptedDocument, DocumentKey)> {
    let document_key = generate_document_key();

    let encrypted_content = codec::encode(plaintext, &document_key)?;
    let wrapped = wrap_document_key(&document_key, master)?;

    let document = EncryptedDocument {
        id,
        encrypted_content,
        encrypted_document_key: wrapped.to_base64(),
        metadata,
    };
    Ok((document, document_key))
}

/// Unwraps a document's key and decrypts its body.
pub fn open_document(document: &EncryptedDocument, master: &MasterKey) -> CryptoResult<Vec<u8>> {
    let wrapped = WrappedDocumentKey::from_base64(&document.encrypted_document_key)?;
    let document_key = unwrap_document_key(&wrapped, master)?;
    codec::decode(&document.encrypted_content, &document_key)
}

/// Rewraps a document key from `old_master` to `new_master`.
///
/// The body is not touched. Used when the user changes their password.
pub fn rewrap_document_key(
    document: &EncryptedDocument,
    old_master: &MasterKey,
    new_master: &MasterKey,
) -> CryptoResult<EncryptedDocument> {
    let wrapped = WrappedDocumentKey::from_base64(&document.encrypted_document_key)?;
    let document_key = unwrap_document_key(&wrapped, old_master)?;
    let rewrapped = wrap_document_key(&document_key, new_master)?;

    Ok(EncryptedDocument {
        encrypted_document_key: rewrapped.to_base64(),
        ..document.clone()
    })
}

/// What can be shown about a document without decrypting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDocumentSummary {
    pub id: DocumentId,
    pub title: String,
    /// Size of both base64 blobs in bytes.
    pub encrypted_size: usize,
}

impl From<&EncryptedDocument> for EncryptedDocumentSummary {
    fn from(doc: &EncryptedDocument) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.metadata.title.clone(),
            encrypted_size: doc.encrypted_content.len() + doc.encrypted_document_key.len(),
        }
    }
}
