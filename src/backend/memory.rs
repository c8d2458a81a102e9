//! In-process native backend
//!
//! Stands in for a host storage area. Handles are cheap clones over shared
//! state, so the host (or a test) can keep a handle after giving one to an
//! engine.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::table::StorageTable;

use super::{BackendError, BackendResult, NativeBackend};

/// Shared-state native backend with an optional byte quota
///
/// Usage is counted as the sum of key and value lengths in bytes. A write
/// that would exceed the quota is rejected and leaves the area unchanged.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    table: StorageTable,
    used_bytes: usize,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Create an unlimited backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects writes past `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        let backend = Self::default();
        backend.inner.write().quota = Some(quota);
        backend
    }

    /// Bytes currently counted against the quota
    pub fn used_bytes(&self) -> usize {
        self.inner.read().used_bytes
    }

    /// The configured quota, if any
    pub fn quota(&self) -> Option<usize> {
        self.inner.read().quota
    }

    /// Ordered copy of the stored entries
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.inner
            .read()
            .table
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl NativeBackend for MemoryBackend {
    fn length(&self) -> usize {
        self.inner.read().table.len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.inner.read().table.key(index).map(str::to_string)
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.read().table.get(key).map(str::to_string)
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        let mut inner = self.inner.write();

        let freed = inner.table.get(key).map_or(0, |old| key.len() + old.len());
        let needed = inner.used_bytes - freed + key.len() + value.len();

        if let Some(quota) = inner.quota {
            if needed > quota {
                return Err(BackendError::QuotaExceeded { needed, quota });
            }
        }

        inner.table.insert(key.to_string(), value.to_string());
        inner.used_bytes = needed;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> BackendResult<()> {
        let mut inner = self.inner.write();
        if let Some(old) = inner.table.remove(key) {
            inner.used_bytes -= key.len() + old.len();
        }
        Ok(())
    }

    fn clear(&mut self) -> BackendResult<()> {
        let mut inner = self.inner.write();
        inner.table.clear();
        inner.used_bytes = 0;
        Ok(())
    }
}
