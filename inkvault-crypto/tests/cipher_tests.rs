use inkvault_crypto::{
    CryptoError, EncryptedPayload, NONCE_SIZE, TAG_SIZE, decrypt, encrypt, generate_random_key,
};

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = generate_random_key();
    let plaintext = b"Hello, World!";
    let encrypted = encrypt(&key, plaintext).unwrap();
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn encrypt_decrypt_empty() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"").unwrap();
    assert_eq!(encrypted.ciphertext.len(), TAG_SIZE);
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, b"");
}

#[test]
fn encrypt_decrypt_large_data() {
    let key = generate_random_key();
    let plaintext: Vec<u8> = (0..100_000).map(|i| (i % 256) as u8).collect();
    let encrypted = encrypt(&key, &plaintext).unwrap();
    let decrypted = decrypt(&key, &encrypted).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn ciphertext_is_plaintext_plus_tag() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"sixteen bytes!!!").unwrap();
    assert_eq!(encrypted.ciphertext.len(), 16 + TAG_SIZE);
    assert_eq!(encrypted.len(), NONCE_SIZE + 16 + TAG_SIZE);
}

#[test]
fn wrong_key_fails_decryption() {
    let key1 = generate_random_key();
    let key2 = generate_random_key();
    let encrypted = encrypt(&key1, b"Secret").unwrap();
    let err = decrypt(&key2, &encrypted).unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
}

#[test]
fn tampered_ciphertext_fails_decryption() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"Secret").unwrap();
    encrypted.ciphertext[0] ^= 0x01;
    assert!(matches!(
        decrypt(&key, &encrypted),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn tampered_tag_fails_decryption() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"Secret").unwrap();
    let last = encrypted.ciphertext.len() - 1;
    encrypted.ciphertext[last] ^= 0x80;
    assert!(decrypt(&key, &encrypted).is_err());
}

#[test]
fn tampered_nonce_fails_decryption() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"Secret").unwrap();
    encrypted.nonce[3] ^= 0x10;
    assert!(decrypt(&key, &encrypted).is_err());
}

#[test]
fn every_single_bit_flip_is_detected() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"bit flips").unwrap();
    let bytes = encrypted.to_bytes();

    for bit in 0..bytes.len() * 8 {
        let mut tampered = bytes.clone();
        tampered[bit / 8] ^= 1 << (bit % 8);
        let payload = EncryptedPayload::from_bytes(&tampered).unwrap();
        assert!(decrypt(&key, &payload).is_err(), "bit {bit} flip went undetected");
    }
}

#[test]
fn same_plaintext_produces_different_ciphertext() {
    let key = generate_random_key();
    let e1 = encrypt(&key, b"Same").unwrap();
    let e2 = encrypt(&key, b"Same").unwrap();
    assert_ne!(e1.nonce, e2.nonce);
    assert_ne!(e1.ciphertext, e2.ciphertext);
}

// ── EncryptedPayload ─────────────────────────────────────────────

#[test]
fn payload_is_empty() {
    let payload = EncryptedPayload {
        nonce: [0u8; NONCE_SIZE],
        ciphertext: vec![],
    };
    assert!(payload.is_empty());

    let key = generate_random_key();
    assert!(!encrypt(&key, b"data").unwrap().is_empty());
}

#[test]
fn payload_bytes_start_with_nonce() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"layout").unwrap();
    let bytes = encrypted.to_bytes();
    assert_eq!(&bytes[..NONCE_SIZE], &encrypted.nonce);
    assert_eq!(&bytes[NONCE_SIZE..], encrypted.ciphertext.as_slice());
}

#[test]
fn base64_roundtrip() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"Data").unwrap();
    let decoded = EncryptedPayload::from_base64(&encrypted.to_base64()).unwrap();
    assert_eq!(decoded, encrypted);
}

#[test]
fn base64_uses_standard_alphabet_with_padding() {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"x").unwrap();
    let encoded = encrypted.to_base64();
    assert_eq!(STANDARD.decode(&encoded).unwrap(), encrypted.to_bytes());
}

#[test]
fn base64_too_short_fails() {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let short = STANDARD.encode([0u8; NONCE_SIZE + TAG_SIZE - 1]);
    assert!(matches!(
        EncryptedPayload::from_base64(&short),
        Err(CryptoError::MalformedWireFormat(_))
    ));
}

#[test]
fn base64_minimum_length_is_accepted() {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let minimal = STANDARD.encode([0u8; NONCE_SIZE + TAG_SIZE]);
    let payload = EncryptedPayload::from_base64(&minimal).unwrap();
    assert_eq!(payload.ciphertext.len(), TAG_SIZE);
}

#[test]
fn base64_invalid_fails() {
    assert!(matches!(
        EncryptedPayload::from_base64("!!!not-base64!!!"),
        Err(CryptoError::MalformedWireFormat(_))
    ));
}
