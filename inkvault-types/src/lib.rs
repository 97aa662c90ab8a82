//! Core identifier types for inkvault.
//!
//! Document and workspace identifiers are assigned by the storage server and
//! travel as opaque strings. Locally created documents get a UUID v7 so they
//! sort by creation time, but any non-empty server id is accepted.

mod ids;

pub use ids::{DocumentId, WorkspaceId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("identifier must not be empty")]
    EmptyId,
}
