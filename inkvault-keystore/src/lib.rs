//! Master key derivation and durable local key storage.
//!
//! The master key is stored as a single `{ key, salt }` record keyed
//! `"master"`. Two backends are provided: [`SqliteKeyStore`] for the
//! on-device store and [`MemoryKeyStore`] for tests and ephemeral sessions.

mod error;
mod service;
mod sqlite;
mod store;

pub use error::{KeyStoreError, KeyStoreResult};
pub use service::{MASTER_KEY_ID, MIN_PASSWORD_LEN, MasterKeyService};
pub use sqlite::SqliteKeyStore;
pub use store::{KeyRecord, KeyStore, MemoryKeyStore};
