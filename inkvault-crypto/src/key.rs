//! Key types and password-based key derivation.
//!
//! Master keys are either random or derived from a password with
//! PBKDF2-HMAC-SHA256. Document keys are always random.

use crate::error::{CryptoError, CryptoResult};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of salt in bytes.
pub const SALT_SIZE: usize = 16;

/// PBKDF2 iteration count used by stored data. Lowering it weakens every
/// password-derived master key.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// A 256-bit symmetric key with automatic zeroization on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_SIZE],
}

/// Per-document content key.
pub type DocumentKey = SecretKey;

impl SecretKey {
    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a key from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt for key derivation. Not secret; stored next to the key it salts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Generates a random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a salt from raw bytes.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Creates a salt from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; SALT_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::MalformedWireFormat(format!(
                "salt must be {SALT_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Returns the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}

/// The user's master key: wraps every document key they own.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey {
    key: SecretKey,
    salt: Salt,
}

impl MasterKey {
    /// Pairs key material with the salt it was created alongside.
    pub fn new(key: SecretKey, salt: Salt) -> Self {
        Self { key, salt }
    }

    /// Generates a random master key with a fresh random salt.
    pub fn generate() -> Self {
        Self {
            key: generate_random_key(),
            salt: Salt::random(),
        }
    }

    /// The key used to wrap document keys.
    pub fn key(&self) -> &SecretKey {
        &self.key
    }

    /// The salt stored with this key.
    pub fn salt(&self) -> &Salt {
        &self.salt
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .field("salt", &self.salt)
            .finish()
    }
}

/// Key derivation parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// PBKDF2-HMAC-SHA256 iteration count.
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

/// Derives a master key from a password using PBKDF2-HMAC-SHA256.
///
/// Deterministic: the same password and salt always produce the same key, so
/// the master key can be rebuilt on a new device without ever being stored.
pub fn derive_master_key(
    password: &str,
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<MasterKey> {
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be positive".to_string(),
        ));
    }
    if params.iterations < DEFAULT_PBKDF2_ITERATIONS {
        warn!(
            iterations = params.iterations,
            "deriving master key below the default PBKDF2 iteration count"
        );
    }

    let mut key_bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        params.iterations,
        &mut key_bytes,
    );
    let key = SecretKey::from_bytes(key_bytes);
    key_bytes.zeroize();

    Ok(MasterKey::new(key, salt.clone()))
}

/// Generates a random 256-bit key.
pub fn generate_random_key() -> SecretKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let key = SecretKey::from_bytes(bytes);
    bytes.zeroize();
    key
}

/// Generates a fresh document key.
pub fn generate_document_key() -> DocumentKey {
    generate_random_key()
}
