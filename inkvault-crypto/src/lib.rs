//! Zero-knowledge encryption core for inkvault.
//!
//! The server stores and relays ciphertext it can never read. Key hierarchy:
//!
//! ```text
//! Master Key (256-bit, random or PBKDF2-HMAC-SHA256 from password)
//!   └── Document Key (per document, 256-bit random, wrapped by master key)
//!         └── Body: AES-256-GCM, base64(nonce[12] || ciphertext || tag[16])
//! ```
//!
//! Decryption always fails closed: a wrong key or any tampered byte yields an
//! error, never altered plaintext.

pub mod cache;
pub mod cipher;
pub mod codec;
pub mod document;
pub mod error;
pub mod key;
pub mod wrap;

pub use cache::{CacheStats, DocumentKeyCache};
pub use cipher::{EncryptedPayload, NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use codec::{
    BatchItem, BatchOutcome, KeyLookup, decode, decode_batch, decode_json, encode, encode_json,
};
pub use document::{
    DocumentMetadata, EncryptedDocument, EncryptedDocumentSummary, open_document,
    rewrap_document_key, seal_document,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    DEFAULT_PBKDF2_ITERATIONS, DocumentKey, KEY_SIZE, KdfParams, MasterKey, SALT_SIZE, Salt,
    SecretKey, derive_master_key, generate_document_key, generate_random_key,
};
pub use wrap::{WRAPPED_KEY_SIZE, WrappedDocumentKey, unwrap_document_key, wrap_document_key};
