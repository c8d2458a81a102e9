//! Tests for native backends
//!
//! These tests verify:
//! - MemoryBackend follows the host contract
//! - Quota accounting and rejection
//! - FailingBackend injects and clears write failures
//! - The availability probe

use shimstore::backend::{BackendError, FailingBackend, MemoryBackend, NativeBackend};
use shimstore::engine::probe_native;

// =============================================================================
// MemoryBackend Tests
// =============================================================================

#[test]
fn test_memory_backend_set_get() {
    let mut backend = MemoryBackend::new();

    backend.set_item("a", "1").unwrap();

    assert_eq!(backend.get_item("a"), Some("1".to_string()));
    assert_eq!(backend.length(), 1);
    assert_eq!(backend.key(0), Some("a".to_string()));
    assert_eq!(backend.key(1), None);
}

#[test]
fn test_memory_backend_remove_and_clear() {
    let mut backend = MemoryBackend::new();
    backend.set_item("a", "1").unwrap();
    backend.set_item("b", "2").unwrap();

    backend.remove_item("a").unwrap();
    assert_eq!(backend.get_item("a"), None);
    assert_eq!(backend.length(), 1);

    backend.clear().unwrap();
    assert_eq!(backend.length(), 0);
    assert_eq!(backend.used_bytes(), 0);
}

#[test]
fn test_memory_backend_clones_share_state() {
    let backend = MemoryBackend::new();
    let mut writer = backend.clone();

    writer.set_item("k", "v").unwrap();

    assert_eq!(backend.get_item("k"), Some("v".to_string()));
    assert_eq!(backend.snapshot(), vec![("k".to_string(), "v".to_string())]);
}

#[test]
fn test_memory_backend_used_bytes_tracks_overwrites() {
    let mut backend = MemoryBackend::new();

    backend.set_item("key", "12345").unwrap();
    assert_eq!(backend.used_bytes(), 8);

    backend.set_item("key", "1").unwrap();
    assert_eq!(backend.used_bytes(), 4);

    backend.remove_item("key").unwrap();
    assert_eq!(backend.used_bytes(), 0);
}

#[test]
fn test_memory_backend_quota_rejects_write() {
    let mut backend = MemoryBackend::with_quota(10);

    backend.set_item("a", "123456789").unwrap();
    let result = backend.set_item("b", "1");

    assert_eq!(
        result,
        Err(BackendError::QuotaExceeded {
            needed: 12,
            quota: 10
        })
    );
    assert_eq!(backend.get_item("b"), None);
    assert_eq!(backend.used_bytes(), 10);
    assert_eq!(backend.quota(), Some(10));
}

#[test]
fn test_memory_backend_quota_allows_shrinking_overwrite() {
    let mut backend = MemoryBackend::with_quota(10);
    backend.set_item("a", "123456789").unwrap();

    backend.set_item("a", "1").unwrap();

    assert_eq!(backend.get_item("a"), Some("1".to_string()));
}

// =============================================================================
// FailingBackend Tests
// =============================================================================

#[test]
fn test_failing_backend_passes_through_by_default() {
    let inner = MemoryBackend::new();
    let mut backend = FailingBackend::new(inner.clone());

    backend.set_item("a", "1").unwrap();

    assert_eq!(inner.get_item("a"), Some("1".to_string()));
}

#[test]
fn test_failing_backend_switch_rejects_set() {
    let inner = MemoryBackend::new();
    let mut backend = FailingBackend::new(inner.clone());
    let switch = backend.switch();

    switch.fail_set(true);
    assert!(matches!(
        backend.set_item("a", "1"),
        Err(BackendError::Rejected(_))
    ));
    assert_eq!(inner.length(), 0);

    switch.fail_set(false);
    backend.set_item("a", "1").unwrap();
    assert_eq!(inner.length(), 1);
}

#[test]
fn test_failing_backend_switches_are_independent() {
    let mut backend = FailingBackend::new(MemoryBackend::new());
    let switch = backend.switch();
    backend.set_item("a", "1").unwrap();

    switch.fail_remove(true);

    assert!(backend.remove_item("a").is_err());
    assert!(backend.set_item("b", "2").is_ok());
    assert!(backend.clear().is_ok());
}

#[test]
fn test_failing_backend_reads_pass_through_while_failing() {
    let mut inner = MemoryBackend::new();
    inner.set_item("a", "1").unwrap();
    let backend = FailingBackend::unavailable(inner);

    assert_eq!(backend.get_item("a"), Some("1".to_string()));
    assert_eq!(backend.length(), 1);
}

// =============================================================================
// Probe Tests
// =============================================================================

#[test]
fn test_probe_accepts_working_backend_and_cleans_up() {
    let mut backend = MemoryBackend::new();

    probe_native(&mut backend, "__probe__").unwrap();

    assert_eq!(backend.length(), 0);
}

#[test]
fn test_probe_restores_existing_value_under_probe_key() {
    let mut backend = MemoryBackend::new();
    backend.set_item("__probe__", "real data").unwrap();
    backend.set_item("other", "1").unwrap();

    probe_native(&mut backend, "__probe__").unwrap();

    assert_eq!(backend.get_item("__probe__"), Some("real data".to_string()));
    assert_eq!(backend.key(0), Some("__probe__".to_string()));
    assert_eq!(backend.length(), 2);
}

#[test]
fn test_probe_rejects_unavailable_backend() {
    let mut backend = FailingBackend::unavailable(MemoryBackend::new());

    assert!(probe_native(&mut backend, "__probe__").is_err());
}

#[test]
fn test_probe_rejects_full_backend() {
    let mut backend = MemoryBackend::with_quota(0);

    assert!(matches!(
        probe_native(&mut backend, "__probe__"),
        Err(BackendError::QuotaExceeded { .. })
    ));
}
