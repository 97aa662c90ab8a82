//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The AEAD tag did not verify (wrong key or tampered data).
    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailure,

    /// A wrapped document key could not be unwrapped with the master key.
    #[error("document key unwrap failed: {0}")]
    KeyUnwrapFailed(#[source] Box<CryptoError>),

    /// No cached key and no wrapped key to unwrap.
    #[error("no document key available for {0}")]
    KeyNotFound(String),

    /// Base64 or length invariants of the wire format were violated.
    #[error("malformed wire format: {0}")]
    MalformedWireFormat(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A batch worker was cancelled or panicked.
    #[error("batch task failed: {0}")]
    Task(String),
}

impl CryptoError {
    /// Whether this error (or the error it wraps) is an AEAD tag mismatch.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            Self::AuthenticationFailure => true,
            Self::KeyUnwrapFailed(inner) => inner.is_authentication_failure(),
            _ => false,
        }
    }
}
