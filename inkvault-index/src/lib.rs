//! Client-side search and backlinks for inkvault.
//!
//! The server only ever sees ciphertext plus plaintext titles, tags and
//! folders, so filtering by content happens here: fetch everything in scope,
//! decrypt through a [`WorkspaceSession`], then match locally. A document
//! that fails to decrypt is logged and skipped, never fatal to the scan.

mod config;
mod error;
pub mod fuzzy;
mod indexer;
mod session;
mod source;

pub use config::{IndexerConfig, SearchField, SearchOptions};
pub use error::{IndexError, IndexResult};
pub use fuzzy::{FuzzyMatch, fuzzy_match};
pub use indexer::{
    Backlink, BacklinkOutcome, ClientIndexer, Highlight, SearchOutcome, SearchResult,
};
pub use session::{OpenedDocument, SkippedDocument, WorkspaceSession};
pub use source::{DirectorySource, DocumentSource, MemorySource};
