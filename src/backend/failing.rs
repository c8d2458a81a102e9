//! Backend with switchable write failures
//!
//! Wraps another backend and rejects writes while the matching switch is
//! on. Reads always pass through.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{BackendError, BackendResult, NativeBackend};

/// Cloneable handle that turns write failures on and off
#[derive(Debug, Clone, Default)]
pub struct FaultSwitch {
    set: Arc<AtomicBool>,
    remove: Arc<AtomicBool>,
    clear: Arc<AtomicBool>,
}

impl FaultSwitch {
    /// Reject (or stop rejecting) `set_item`
    pub fn fail_set(&self, fail: bool) {
        self.set.store(fail, Ordering::SeqCst);
    }

    /// Reject (or stop rejecting) `remove_item`
    pub fn fail_remove(&self, fail: bool) {
        self.remove.store(fail, Ordering::SeqCst);
    }

    /// Reject (or stop rejecting) `clear`
    pub fn fail_clear(&self, fail: bool) {
        self.clear.store(fail, Ordering::SeqCst);
    }

    /// Reject every kind of write
    pub fn fail_all(&self, fail: bool) {
        self.fail_set(fail);
        self.fail_remove(fail);
        self.fail_clear(fail);
    }
}

/// Backend that delegates to `inner` but can inject write rejections
pub struct FailingBackend<B> {
    inner: B,
    switch: FaultSwitch,
}

impl<B: NativeBackend> FailingBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            switch: FaultSwitch::default(),
        }
    }

    /// A backend that rejects every write from the start, like a host that
    /// exposes storage but refuses to use it
    pub fn unavailable(inner: B) -> Self {
        let backend = Self::new(inner);
        backend.switch.fail_all(true);
        backend
    }

    /// Handle for toggling failures after the backend has been moved
    pub fn switch(&self) -> FaultSwitch {
        self.switch.clone()
    }

    fn check(flag: &AtomicBool, op: &str) -> BackendResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected(format!("Injected {} failure", op)));
        }
        Ok(())
    }
}

impl<B: NativeBackend> NativeBackend for FailingBackend<B> {
    fn length(&self) -> usize {
        self.inner.length()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.inner.key(index)
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> BackendResult<()> {
        Self::check(&self.switch.set, "set_item")?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> BackendResult<()> {
        Self::check(&self.switch.remove, "remove_item")?;
        self.inner.remove_item(key)
    }

    fn clear(&mut self) -> BackendResult<()> {
        Self::check(&self.switch.clear, "clear")?;
        self.inner.clear()
    }
}
