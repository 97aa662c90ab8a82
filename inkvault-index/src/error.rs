//! Error types for the indexer and workspace session.

use inkvault_crypto::CryptoError;
use inkvault_model::ModelError;
use thiserror::Error;

/// Result type for indexer operations.
pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// The master key could not be retrieved. Fatal for the session.
    #[error("cannot unlock workspace: {0}")]
    CannotUnlock(String),

    /// A decrypt was attempted with no unlocked master key.
    #[error("workspace is locked")]
    Locked,

    /// The document source failed.
    #[error("document source error: {0}")]
    Source(String),

    /// The document source did not answer in time.
    #[error("document fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        Self::Source(e.to_string())
    }
}
