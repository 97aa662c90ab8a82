//! Property-based tests for the crypto layer.
//!
//! These properties must always hold:
//! - Encryption is reversible with the correct key
//! - Wrong keys fail decryption and unwrapping
//! - Any single-bit modification is detected
//! - Password derivation is deterministic per (password, salt)

use inkvault_crypto::{
    EncryptedPayload, KdfParams, MasterKey, SecretKey, Salt, decode, decrypt, derive_master_key,
    encode, encrypt, generate_random_key, unwrap_document_key, wrap_document_key,
};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn key_strategy() -> impl Strategy<Value = SecretKey> {
    prop::array::uniform32(any::<u8>()).prop_map(SecretKey::from_bytes)
}

fn salt_strategy() -> impl Strategy<Value = Salt> {
    prop::array::uniform16(any::<u8>()).prop_map(Salt::from_bytes)
}

fn master_strategy() -> impl Strategy<Value = MasterKey> {
    (key_strategy(), salt_strategy()).prop_map(|(key, salt)| MasterKey::new(key, salt))
}

fn plaintext_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4096)
}

fn password_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9!@#$%^&*()]{1,64}").unwrap()
}

/// Fast KDF params for testing.
fn fast_kdf_params() -> KdfParams {
    KdfParams { iterations: 64 }
}

// =============================================================================
// ENCRYPTION PROPERTIES
// =============================================================================

mod encryption_properties {
    use super::*;

    proptest! {
        /// decrypt(encrypt(p, k), k) == p
        #[test]
        fn roundtrip_preserves_data(plaintext in plaintext_strategy(), key in key_strategy()) {
            let encrypted = encrypt(&key, &plaintext).unwrap();
            prop_assert_eq!(decrypt(&key, &encrypted).unwrap(), plaintext);
        }

        /// The base64 wire format round-trips as well.
        #[test]
        fn codec_roundtrip_preserves_data(
            plaintext in plaintext_strategy(),
            key in key_strategy()
        ) {
            let encoded = encode(&plaintext, &key).unwrap();
            prop_assert_eq!(decode(&encoded, &key).unwrap(), plaintext);
        }

        /// Wrong key fails to decrypt.
        #[test]
        fn wrong_key_fails_decryption(plaintext in plaintext_strategy()) {
            let correct = generate_random_key();
            let wrong = generate_random_key();
            let encrypted = encrypt(&correct, &plaintext).unwrap();
            prop_assert!(decrypt(&wrong, &encrypted).is_err());
        }

        /// Flipping any single bit of nonce, ciphertext or tag is detected.
        #[test]
        fn single_bit_flip_is_detected(
            plaintext in plaintext_strategy(),
            bit_seed in any::<usize>(),
        ) {
            let key = generate_random_key();
            let bytes = encrypt(&key, &plaintext).unwrap().to_bytes();
            let bit = bit_seed % (bytes.len() * 8);

            let mut tampered = bytes;
            tampered[bit / 8] ^= 1 << (bit % 8);
            let payload = EncryptedPayload::from_bytes(&tampered).unwrap();

            prop_assert!(decrypt(&key, &payload).is_err());
        }

        /// Nonces are never repeated across calls.
        #[test]
        fn same_key_different_nonces(plaintext in plaintext_strategy()) {
            let key = generate_random_key();
            let a = encrypt(&key, &plaintext).unwrap();
            let b = encrypt(&key, &plaintext).unwrap();
            prop_assert_ne!(a.nonce, b.nonce);
        }
    }
}

// =============================================================================
// KEY WRAPPING PROPERTIES
// =============================================================================

mod wrapping_properties {
    use super::*;

    proptest! {
        /// unwrap(wrap(dk, mk), mk) has dk's raw bytes.
        #[test]
        fn wrap_roundtrip(dk in key_strategy(), mk in master_strategy()) {
            let wrapped = wrap_document_key(&dk, &mk).unwrap();
            let unwrapped = unwrap_document_key(&wrapped, &mk).unwrap();
            prop_assert_eq!(unwrapped.as_bytes(), dk.as_bytes());
        }

        /// unwrap(wrap(dk, mk1), mk2) fails when mk1 != mk2.
        #[test]
        fn wrong_master_rejected(
            dk in key_strategy(),
            mk1 in master_strategy(),
            mk2 in master_strategy(),
        ) {
            prop_assume!(mk1.key() != mk2.key());
            let wrapped = wrap_document_key(&dk, &mk1).unwrap();
            prop_assert!(unwrap_document_key(&wrapped, &mk2).is_err());
        }
    }
}

// =============================================================================
// KEY DERIVATION PROPERTIES
// =============================================================================

mod derivation_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Same inputs always give bit-identical keys.
        #[test]
        fn derivation_is_deterministic(password in password_strategy(), salt in salt_strategy()) {
            let a = derive_master_key(&password, &salt, &fast_kdf_params()).unwrap();
            let b = derive_master_key(&password, &salt, &fast_kdf_params()).unwrap();
            prop_assert_eq!(a.key().as_bytes(), b.key().as_bytes());
        }

        /// Different salts give different keys for the same password.
        #[test]
        fn different_salts_differ(
            password in password_strategy(),
            s1 in salt_strategy(),
            s2 in salt_strategy(),
        ) {
            prop_assume!(s1 != s2);
            let a = derive_master_key(&password, &s1, &fast_kdf_params()).unwrap();
            let b = derive_master_key(&password, &s2, &fast_kdf_params()).unwrap();
            prop_assert_ne!(a.key().as_bytes(), b.key().as_bytes());
        }
    }
}
