//! Master key lifecycle: generation, password derivation, persistence.

use crate::error::{KeyStoreError, KeyStoreResult};
use crate::store::{KeyRecord, KeyStore};
use inkvault_crypto::{
    KEY_SIZE, KdfParams, MasterKey, SALT_SIZE, Salt, SecretKey, derive_master_key,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed identifier of the master key record.
pub const MASTER_KEY_ID: &str = "master";

/// Minimum accepted password length for password-derived master keys.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Creates, derives, stores and retrieves the user's master key.
///
/// The master key never leaves the client: it lives in durable local
/// storage under [`MASTER_KEY_ID`] and in memory for the session.
#[derive(Clone)]
pub struct MasterKeyService {
    store: Arc<dyn KeyStore>,
    params: KdfParams,
}

impl MasterKeyService {
    /// Creates a service with the default PBKDF2 parameters.
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self::with_params(store, KdfParams::default())
    }

    pub fn with_params(store: Arc<dyn KeyStore>, params: KdfParams) -> Self {
        Self { store, params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Generates a fresh random master key and salt and stores them at once.
    pub fn generate_random(&self) -> KeyStoreResult<MasterKey> {
        let master = MasterKey::generate();
        self.store(&master)?;
        info!("Generated new random master key");
        Ok(master)
    }

    /// Derives a master key from a password and salt. Nothing is stored.
    pub fn derive_from_password(&self, password: &str, salt: &Salt) -> KeyStoreResult<MasterKey> {
        Ok(derive_master_key(password, salt, &self.params)?)
    }

    /// First-time setup from a password: random salt, derive, store.
    pub fn initialize_with_password(&self, password: &str) -> KeyStoreResult<MasterKey> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(KeyStoreError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        let master = self.derive_from_password(password, &Salt::random())?;
        self.store(&master)?;
        info!("Initialized password-derived master key");
        Ok(master)
    }

    /// Re-derives the master key with the stored salt and checks it against
    /// the stored key.
    pub fn unlock_with_password(&self, password: &str) -> KeyStoreResult<MasterKey> {
        let stored = self.retrieve()?.ok_or(KeyStoreError::NotInitialized)?;
        let derived = self.derive_from_password(password, stored.salt())?;

        if !constant_time_eq(derived.key().as_bytes(), stored.key().as_bytes()) {
            return Err(KeyStoreError::InvalidPassword);
        }
        Ok(derived)
    }

    /// Persists `{ key, salt }` under [`MASTER_KEY_ID`], replacing any
    /// previous record.
    pub fn store(&self, master: &MasterKey) -> KeyStoreResult<()> {
        let record = KeyRecord {
            key: master.key().as_bytes().to_vec(),
            salt: master.salt().as_bytes().to_vec(),
        };
        self.store.save(MASTER_KEY_ID, &record)?;
        debug!("Stored master key record");
        Ok(())
    }

    /// Reads the stored master key, if any.
    pub fn retrieve(&self) -> KeyStoreResult<Option<MasterKey>> {
        let Some(record) = self.store.load(MASTER_KEY_ID)? else {
            return Ok(None);
        };

        if record.key.len() != KEY_SIZE {
            return Err(KeyStoreError::CorruptRecord(format!(
                "key must be {KEY_SIZE} bytes, got {}",
                record.key.len()
            )));
        }
        if record.salt.len() != SALT_SIZE {
            return Err(KeyStoreError::CorruptRecord(format!(
                "salt must be {SALT_SIZE} bytes, got {}",
                record.salt.len()
            )));
        }

        let key = SecretKey::from_slice(&record.key)?;
        let salt = Salt::from_slice(&record.salt)?;
        Ok(Some(MasterKey::new(key, salt)))
    }

    /// Returns the stored master key, generating and storing one if absent.
    pub fn load_or_generate(&self) -> KeyStoreResult<MasterKey> {
        match self.retrieve()? {
            Some(master) => Ok(master),
            None => self.generate_random(),
        }
    }

    /// Deletes the stored master key. Returns whether one existed.
    pub fn clear(&self) -> KeyStoreResult<bool> {
        let removed = self.store.delete(MASTER_KEY_ID)?;
        if removed {
            info!("Cleared stored master key");
        }
        Ok(removed)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
