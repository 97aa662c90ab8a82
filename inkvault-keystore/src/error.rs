//! Error types for master key storage.

use inkvault_crypto::CryptoError;
use thiserror::Error;

/// Result type for key store operations.
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;

/// Errors that can occur while deriving, storing or loading the master key.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// Durable local storage cannot be opened, read or written.
    #[error("key storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored record has the wrong shape (key or salt length).
    #[error("corrupt key record: {0}")]
    CorruptRecord(String),

    /// No master key has been set up yet.
    #[error("no master key stored")]
    NotInitialized,

    /// Password did not reproduce the stored master key.
    #[error("invalid password")]
    InvalidPassword,

    #[error("password too short (min {min} characters)")]
    PasswordTooShort { min: usize },

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl From<rusqlite::Error> for KeyStoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}
