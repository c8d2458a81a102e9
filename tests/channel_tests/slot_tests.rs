//! Tests for persistence slots
//!
//! These tests verify:
//! - SharedSlot clones share content
//! - SlotRegistry hands out one slot per name
//! - FileSlot reads, writes and tolerates a missing file

use std::fs;

use shimstore::channel::{FileSlot, PersistenceChannel, SharedSlot, SlotRegistry};
use tempfile::TempDir;

// =============================================================================
// SharedSlot Tests
// =============================================================================

#[test]
fn test_shared_slot_starts_empty() {
    let slot = SharedSlot::new();
    assert_eq!(slot.read().unwrap(), None);
}

#[test]
fn test_shared_slot_write_then_read() {
    let slot = SharedSlot::new();

    slot.write("{\"a\":\"1\"}").unwrap();

    assert_eq!(slot.read().unwrap(), Some("{\"a\":\"1\"}".to_string()));
}

#[test]
fn test_shared_slot_clones_share_content() {
    let slot = SharedSlot::new();
    let other = slot.clone();

    slot.set("shared");

    assert_eq!(other.get(), Some("shared".to_string()));
}

#[test]
fn test_shared_slot_reset() {
    let slot = SharedSlot::with_contents("x");
    slot.reset();
    assert_eq!(slot.get(), None);
}

// =============================================================================
// SlotRegistry Tests
// =============================================================================

#[test]
fn test_registry_same_name_same_slot() {
    let registry = SlotRegistry::new();

    let first = registry.slot("session");
    let second = registry.slot("session");
    first.set("hello");

    assert_eq!(second.get(), Some("hello".to_string()));
}

#[test]
fn test_registry_different_names_are_independent() {
    let registry = SlotRegistry::new();

    registry.slot("session").set("s");
    registry.slot("local").set("l");

    assert_eq!(registry.slot("session").get(), Some("s".to_string()));
    assert_eq!(registry.slot("local").get(), Some("l".to_string()));
}

#[test]
fn test_registry_contains() {
    let registry = SlotRegistry::new();
    assert!(!registry.contains("x"));

    let _ = registry.slot("x");

    assert!(registry.contains("x"));
}

#[test]
fn test_global_registry_is_shared() {
    let name = "slot_tests::test_global_registry_is_shared";
    SlotRegistry::global().slot(name).set("global");

    assert_eq!(
        SlotRegistry::global().slot(name).get(),
        Some("global".to_string())
    );
}

// =============================================================================
// FileSlot Tests
// =============================================================================

#[test]
fn test_file_slot_missing_file_reads_none() {
    let temp = TempDir::new().unwrap();
    let slot = FileSlot::new(temp.path().join("absent.json"));

    assert_eq!(slot.read().unwrap(), None);
}

#[test]
fn test_file_slot_write_then_read() {
    let temp = TempDir::new().unwrap();
    let slot = FileSlot::in_dir(temp.path(), "session");

    slot.write("{\"k\":\"v\"}").unwrap();

    assert_eq!(slot.path(), temp.path().join("session.json"));
    assert_eq!(slot.read().unwrap(), Some("{\"k\":\"v\"}".to_string()));
}

#[test]
fn test_file_slot_overwrite_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let slot = FileSlot::in_dir(temp.path(), "local");

    slot.write("first").unwrap();
    slot.write("second").unwrap();

    assert_eq!(slot.read().unwrap(), Some("second".to_string()));
    assert!(!temp.path().join("local.tmp").exists());
}

#[test]
fn test_file_slot_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("a").join("b");
    let slot = FileSlot::in_dir(&nested, "session");

    slot.write("{}").unwrap();

    assert!(nested.join("session.json").exists());
}

#[test]
fn test_file_slot_read_error_on_directory() {
    let temp = TempDir::new().unwrap();
    let dir_path = temp.path().join("slot.json");
    fs::create_dir(&dir_path).unwrap();

    let slot = FileSlot::new(&dir_path);

    assert!(slot.read().is_err());
}
