//! Tests for the slot codec
//!
//! These tests verify:
//! - Encoding keeps enumeration order
//! - Decoding rebuilds keys, values and order
//! - Malformed content is rejected by decode and tolerated by hydrate

use shimstore::channel::{decode_table, encode_table, hydrate, SharedSlot};
use shimstore::table::StorageTable;
use shimstore::ShimError;

fn table_of(pairs: &[(&str, &str)]) -> StorageTable {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// =============================================================================
// Encode Tests
// =============================================================================

#[test]
fn test_encode_empty_table() {
    let encoded = encode_table(&StorageTable::new()).unwrap();
    assert_eq!(encoded, "{}");
}

#[test]
fn test_encode_preserves_order() {
    let table = table_of(&[("zebra", "1"), ("apple", "2")]);

    let encoded = encode_table(&table).unwrap();

    assert_eq!(encoded, r#"{"zebra":"1","apple":"2"}"#);
}

#[test]
fn test_encode_escapes_special_characters() {
    let table = table_of(&[("quote\"key", "line\nbreak"), ("ünïcødé", "☃")]);

    let encoded = encode_table(&table).unwrap();
    let decoded = decode_table(&encoded).unwrap();

    assert_eq!(decoded, table);
}

// =============================================================================
// Decode Tests
// =============================================================================

#[test]
fn test_decode_keeps_document_order() {
    let decoded = decode_table(r#"{"b":"2","a":"1","c":"3"}"#).unwrap();

    assert_eq!(decoded.key(0), Some("b"));
    assert_eq!(decoded.key(1), Some("a"));
    assert_eq!(decoded.key(2), Some("c"));
    assert_eq!(decoded.get("a"), Some("1"));
}

#[test]
fn test_decode_blank_content_is_empty_table() {
    assert!(decode_table("").unwrap().is_empty());
    assert!(decode_table("   \n").unwrap().is_empty());
}

#[test]
fn test_decode_rejects_invalid_json() {
    let result = decode_table("{not json");
    assert!(matches!(result, Err(ShimError::MalformedState(_))));
}

#[test]
fn test_decode_rejects_non_object() {
    assert!(matches!(
        decode_table(r#"["a","b"]"#),
        Err(ShimError::MalformedState(_))
    ));
    assert!(matches!(
        decode_table("42"),
        Err(ShimError::MalformedState(_))
    ));
}

#[test]
fn test_decode_rejects_non_string_values() {
    let result = decode_table(r#"{"a":1}"#);
    assert!(matches!(result, Err(ShimError::MalformedState(_))));
}

#[test]
fn test_decode_duplicate_members_last_value_wins() {
    let decoded = decode_table(r#"{"a":"1","b":"2","a":"3"}"#).unwrap();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded.key(0), Some("a"));
    assert_eq!(decoded.get("a"), Some("3"));
}

// =============================================================================
// Hydrate Tests
// =============================================================================

#[test]
fn test_hydrate_empty_slot() {
    let slot = SharedSlot::new();
    assert!(hydrate(&slot).is_empty());
}

#[test]
fn test_hydrate_valid_slot() {
    let slot = SharedSlot::with_contents(r#"{"a":"1","b":"2"}"#);

    let table = hydrate(&slot);

    assert_eq!(table, table_of(&[("a", "1"), ("b", "2")]));
}

#[test]
fn test_hydrate_corrupt_slot_degrades_to_empty() {
    let slot = SharedSlot::with_contents("window.name was used by someone else");
    assert!(hydrate(&slot).is_empty());
}

#[test]
fn test_hydrate_after_encode() {
    let table = table_of(&[("first", "1"), ("second", "2"), ("third", "3")]);
    let slot = SharedSlot::with_contents(encode_table(&table).unwrap());

    let restored = hydrate(&slot);

    assert_eq!(restored, table);
}
