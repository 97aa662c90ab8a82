//! Plaintext document model.
//!
//! A decrypted document body is a JSON array of blocks. Each block has a
//! `type`, kind-specific fields, and optional nested `children`. Everything
//! the indexer needs (plain text, `[[wiki]]` links and the text around them)
//! is extracted by walking this typed tree.

mod block;
mod error;
mod extract;

pub use block::{Block, BlockKind, DocumentBody, Inline};
pub use error::{ModelError, ModelResult};
pub use extract::{LinkOccurrence, parse_wiki_links};
