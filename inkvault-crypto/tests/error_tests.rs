use inkvault_crypto::CryptoError;
use std::error::Error;

#[test]
fn error_display_key_derivation() {
    let err = CryptoError::KeyDerivation("bad params".into());
    assert!(format!("{err}").contains("key derivation failed"));
    assert!(format!("{err}").contains("bad params"));
}

#[test]
fn error_display_authentication_failure() {
    let err = CryptoError::AuthenticationFailure;
    assert!(format!("{err}").contains("authentication failed"));
}

#[test]
fn key_unwrap_failed_chains_its_source() {
    let err = CryptoError::KeyUnwrapFailed(Box::new(CryptoError::AuthenticationFailure));
    assert!(format!("{err}").contains("unwrap failed"));
    let source = err.source().expect("source is chained");
    assert!(source.to_string().contains("authentication failed"));
    assert!(err.is_authentication_failure());
}

#[test]
fn malformed_wire_format_is_not_authentication_failure() {
    let err = CryptoError::KeyUnwrapFailed(Box::new(CryptoError::InvalidKeyLength {
        expected: 32,
        actual: 16,
    }));
    assert!(!err.is_authentication_failure());
    assert!(!CryptoError::MalformedWireFormat("short".into()).is_authentication_failure());
}

#[test]
fn error_display_key_not_found() {
    let err = CryptoError::KeyNotFound("doc-1".into());
    assert!(format!("{err}").contains("doc-1"));
}

#[test]
fn error_display_invalid_key_length() {
    let err = CryptoError::InvalidKeyLength {
        expected: 32,
        actual: 16,
    };
    let msg = format!("{err}");
    assert!(msg.contains("32"));
    assert!(msg.contains("16"));
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let crypto_err: CryptoError = serde_err.unwrap_err().into();
    assert!(format!("{crypto_err}").contains("serialization"));
}
