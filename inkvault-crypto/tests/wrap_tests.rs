use inkvault_crypto::{
    CryptoError, KdfParams, MasterKey, Salt, WRAPPED_KEY_SIZE, WrappedDocumentKey,
    derive_master_key, generate_document_key, unwrap_document_key, wrap_document_key,
};

#[test]
fn wrap_unwrap_roundtrip() {
    let master = MasterKey::generate();
    let document_key = generate_document_key();

    let wrapped = wrap_document_key(&document_key, &master).unwrap();
    let unwrapped = unwrap_document_key(&wrapped, &master).unwrap();

    assert_eq!(unwrapped.as_bytes(), document_key.as_bytes());
}

#[test]
fn wrap_unwrap_through_base64() {
    let master = MasterKey::generate();
    let document_key = generate_document_key();

    let encoded = wrap_document_key(&document_key, &master).unwrap().to_base64();
    let wrapped = WrappedDocumentKey::from_base64(&encoded).unwrap();
    let unwrapped = unwrap_document_key(&wrapped, &master).unwrap();

    assert_eq!(unwrapped, document_key);
}

#[test]
fn wrapped_key_size() {
    let master = MasterKey::generate();
    let wrapped = wrap_document_key(&generate_document_key(), &master).unwrap();
    // nonce (12) + key (32) + tag (16) = 60
    assert_eq!(wrapped.as_payload().len(), 60);
    assert_eq!(WRAPPED_KEY_SIZE, 60);
}

#[test]
fn wrapping_twice_uses_fresh_nonces() {
    let master = MasterKey::generate();
    let document_key = generate_document_key();
    let a = wrap_document_key(&document_key, &master).unwrap();
    let b = wrap_document_key(&document_key, &master).unwrap();
    assert_ne!(a.to_base64(), b.to_base64());
}

#[test]
fn unwrap_with_wrong_master_fails() {
    let master1 = MasterKey::generate();
    let master2 = MasterKey::generate();
    let wrapped = wrap_document_key(&generate_document_key(), &master1).unwrap();

    let err = unwrap_document_key(&wrapped, &master2).unwrap_err();
    assert!(matches!(err, CryptoError::KeyUnwrapFailed(_)));
    assert!(err.is_authentication_failure());
}

#[test]
fn unwrap_with_wrong_password_fails() {
    let salt = Salt::from_bytes([4; 16]);
    let params = KdfParams { iterations: 1_000 };
    let right = derive_master_key("right password", &salt, &params).unwrap();
    let wrong = derive_master_key("wrong password", &salt, &params).unwrap();

    let wrapped = wrap_document_key(&generate_document_key(), &right).unwrap();
    assert!(unwrap_document_key(&wrapped, &wrong).is_err());
}

#[test]
fn unwrap_corrupted_blob_fails() {
    let master = MasterKey::generate();
    let wrapped = wrap_document_key(&generate_document_key(), &master).unwrap();

    let mut bytes = wrapped.as_payload().to_bytes();
    bytes[20] ^= 0xFF;
    use base64::{Engine, engine::general_purpose::STANDARD};
    let corrupted = WrappedDocumentKey::from_base64(&STANDARD.encode(&bytes)).unwrap();

    assert!(matches!(
        unwrap_document_key(&corrupted, &master),
        Err(CryptoError::KeyUnwrapFailed(_))
    ));
}

#[test]
fn wrapped_key_with_wrong_length_is_malformed() {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let too_long = STANDARD.encode([0u8; WRAPPED_KEY_SIZE + 1]);
    assert!(matches!(
        WrappedDocumentKey::from_base64(&too_long),
        Err(CryptoError::MalformedWireFormat(_))
    ));
}

#[test]
fn wrapped_key_invalid_base64_is_malformed() {
    assert!(matches!(
        WrappedDocumentKey::from_base64("%%%"),
        Err(CryptoError::MalformedWireFormat(_))
    ));
}
