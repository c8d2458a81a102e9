//! Native Backend Module
//!
//! Abstraction over the host's native storage area.
//!
//! ## Responsibilities
//! - Expose the host contract: reads never fail, writes may be rejected
//! - Report rejections (quota, unavailable storage) as `BackendError`
//! - Provide an in-process native stand-in and a fault-injection wrapper
//!
//! A `NativeBackend` is handed to an engine at construction; the engine
//! owns it until a rejected write switches it to fallback mode, at which
//! point the backend is dropped.

mod failing;
mod memory;

pub use failing::{FailingBackend, FaultSwitch};
pub use memory::MemoryBackend;

use thiserror::Error;

/// Result type for native backend writes
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Reasons a native backend rejects a write
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The write would take the area past its quota
    #[error("Quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The host exposes the area but refuses all writes (e.g. private mode)
    #[error("Native storage unavailable: {0}")]
    Unavailable(String),

    /// Any other rejection
    #[error("Native storage rejected the write: {0}")]
    Rejected(String),
}

/// The host's native key/value storage area
pub trait NativeBackend: Send {
    /// Number of keys currently stored
    fn length(&self) -> usize;

    /// Key at `index` in the backend's enumeration order
    fn key(&self, index: usize) -> Option<String>;

    /// Value stored under `key`
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()>;

    /// Remove `key` if present
    fn remove_item(&mut self, key: &str) -> BackendResult<()>;

    /// Remove every key
    fn clear(&mut self) -> BackendResult<()>;
}

impl<B: NativeBackend + ?Sized> NativeBackend for Box<B> {
    fn length(&self) -> usize {
        (**self).length()
    }

    fn key(&self, index: usize) -> Option<String> {
        (**self).key(index)
    }

    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> BackendResult<()> {
        (**self).remove_item(key)
    }

    fn clear(&mut self) -> BackendResult<()> {
        (**self).clear()
    }
}
