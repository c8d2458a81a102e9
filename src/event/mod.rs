//! Change Notification Module
//!
//! Events emitted by fallback engines on every observable mutation, and
//! the sinks they are published to.
//!
//! ## Event Shape
//! Mirrors the host's storage-change event:
//! ```text
//! { key, oldValue, newValue, url, storageArea, bubbles: true, cancelable: false }
//! ```
//! `key`, `oldValue` and `newValue` are all null for a `clear()`.
//!
//! Delivery is synchronous on the mutating thread, after the mutation has
//! been committed.

mod bus;

pub use bus::{EventBus, ListenerId};

use std::sync::Arc;

use crossbeam::channel::Sender;
use serde::Serialize;

use crate::engine::StorageKind;

/// Identifies the engine that emitted an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageArea {
    pub kind: StorageKind,
    pub engine_id: u64,
}

/// A storage-change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageEvent {
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub url: String,
    pub storage_area: StorageArea,
    pub bubbles: bool,
    pub cancelable: bool,
}

impl StorageEvent {
    pub fn new(
        storage_area: StorageArea,
        url: impl Into<String>,
        key: Option<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            key,
            old_value,
            new_value,
            url: url.into(),
            storage_area,
            bubbles: true,
            cancelable: false,
        }
    }

    /// True for the event `clear()` emits
    pub fn is_clear(&self) -> bool {
        self.key.is_none()
    }
}

/// Capability an engine publishes its events through
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: &StorageEvent);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn publish(&self, event: &StorageEvent) {
        (**self).publish(event)
    }
}

impl NotificationSink for Sender<StorageEvent> {
    fn publish(&self, event: &StorageEvent) {
        // A dropped receiver just means nobody is listening
        let _ = self.send(event.clone());
    }
}
