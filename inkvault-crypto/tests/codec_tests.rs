use inkvault_crypto::{
    BatchItem, CryptoError, CryptoResult, DocumentKey, decode, decode_batch, decode_json, encode,
    encode_json, generate_document_key,
};
use inkvault_types::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Note {
    heading: String,
    lines: Vec<String>,
}

// ── encode / decode ──────────────────────────────────────────────

#[test]
fn encode_decode_roundtrip() {
    let key = generate_document_key();
    let encoded = encode(b"document body", &key).unwrap();
    assert_eq!(decode(&encoded, &key).unwrap(), b"document body");
}

#[test]
fn encode_json_decode_json_roundtrip() {
    let key = generate_document_key();
    let note = Note {
        heading: "Groceries".into(),
        lines: vec!["eggs".into(), "milk".into()],
    };
    let encoded = encode_json(&note, &key).unwrap();
    let decoded: Note = decode_json(&encoded, &key).unwrap();
    assert_eq!(decoded, note);
}

#[test]
fn decode_json_with_non_json_plaintext_fails() {
    let key = generate_document_key();
    let encoded = encode(b"not json", &key).unwrap();
    let err = decode_json::<Note>(&encoded, &key).unwrap_err();
    assert!(matches!(err, CryptoError::Serialization(_)));
}

#[test]
fn decode_with_wrong_key_fails() {
    let encoded = encode(b"private", &generate_document_key()).unwrap();
    let err = decode(&encoded, &generate_document_key()).unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
}

#[test]
fn decode_garbage_is_malformed() {
    let key = generate_document_key();
    assert!(matches!(
        decode("definitely not base64!", &key),
        Err(CryptoError::MalformedWireFormat(_))
    ));
}

// ── decode_batch ─────────────────────────────────────────────────

fn sealed_batch(count: usize) -> (Vec<BatchItem>, HashMap<DocumentId, DocumentKey>) {
    let mut items = Vec::new();
    let mut keys = HashMap::new();
    for i in 0..count {
        let id = DocumentId::from(format!("doc-{i}").as_str());
        let key = generate_document_key();
        let encoded = encode(format!("body {i}").as_bytes(), &key).unwrap();
        items.push(BatchItem {
            id: id.clone(),
            encoded,
        });
        keys.insert(id, key);
    }
    (items, keys)
}

fn lookup_from(
    keys: HashMap<DocumentId, DocumentKey>,
) -> impl Fn(&DocumentId) -> CryptoResult<DocumentKey> + Send + Sync + 'static {
    move |id: &DocumentId| {
        keys.get(id)
            .cloned()
            .ok_or_else(|| CryptoError::KeyNotFound(id.to_string()))
    }
}

#[tokio::test]
async fn batch_decodes_every_item_in_order() {
    let (items, keys) = sealed_batch(8);
    let outcomes = decode_batch(items, Arc::new(lookup_from(keys))).await;

    assert_eq!(outcomes.len(), 8);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.id.as_str(), format!("doc-{i}"));
        assert_eq!(outcome.result.as_ref().unwrap(), format!("body {i}").as_bytes());
    }
}

#[tokio::test]
async fn batch_isolates_a_corrupted_payload() {
    let (mut items, keys) = sealed_batch(5);
    items[2].encoded = {
        use base64::{Engine, engine::general_purpose::STANDARD};
        let mut bytes = STANDARD.decode(&items[2].encoded).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        STANDARD.encode(bytes)
    };

    let outcomes = decode_batch(items, Arc::new(lookup_from(keys))).await;

    let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id.as_str(), "doc-2");
    assert!(matches!(
        failed[0].result,
        Err(CryptoError::AuthenticationFailure)
    ));
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 4);
}

#[tokio::test]
async fn batch_reports_missing_keys_per_item() {
    let (items, mut keys) = sealed_batch(3);
    keys.remove(&DocumentId::from("doc-0"));

    let outcomes = decode_batch(items, Arc::new(lookup_from(keys))).await;

    assert!(matches!(outcomes[0].result, Err(CryptoError::KeyNotFound(_))));
    assert!(outcomes[1].is_ok());
    assert!(outcomes[2].is_ok());
}

#[tokio::test]
async fn batch_reports_malformed_payloads() {
    let (mut items, keys) = sealed_batch(2);
    items[1].encoded = "@@@".into();

    let outcomes = decode_batch(items, Arc::new(lookup_from(keys))).await;

    assert!(outcomes[0].is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(CryptoError::MalformedWireFormat(_))
    ));
}

#[tokio::test]
async fn empty_batch_is_empty() {
    let outcomes = decode_batch(Vec::new(), Arc::new(lookup_from(HashMap::new()))).await;
    assert!(outcomes.is_empty());
}
