//! Authenticated encryption using AES-256-GCM.
//!
//! Every call to [`encrypt`] draws a fresh random 96-bit nonce; a nonce is
//! never reused under the same key. Decryption fails closed on any tag
//! mismatch.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SecretKey;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Size of nonce in bytes (96 bits for AES-GCM).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypted data with the nonce needed for decryption.
///
/// Wire format: `base64(nonce[12] || ciphertext || tag[16])`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// The nonce used for encryption (unique per encryption).
    pub nonce: [u8; NONCE_SIZE],
    /// The encrypted ciphertext (includes auth tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Returns the total size of the encrypted data.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Concatenates `nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Splits `nonce || ciphertext`, rejecting input too short to hold a tag.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::MalformedWireFormat(format!(
                "payload too short: {} bytes (minimum {})",
                bytes.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Encodes to base64 for storage/transmission.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes from base64.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::MalformedWireFormat(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

/// Encrypts plaintext using AES-256-GCM with a fresh random nonce.
pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> CryptoResult<EncryptedPayload> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedPayload {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypts a payload produced by [`encrypt`].
///
/// Returns [`CryptoError::AuthenticationFailure`] for a wrong key or any
/// modification of nonce, ciphertext or tag. No partial plaintext is ever
/// returned.
pub fn decrypt(key: &SecretKey, payload: &EncryptedPayload) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from_slice(&payload.nonce);

    cipher
        .decrypt(nonce, payload.ciphertext.as_ref())
        .map_err(|_| CryptoError::AuthenticationFailure)
}
