//! Event bus
//!
//! Broadcasts every published event to callback listeners and to channel
//! subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::trace;

use super::{NotificationSink, StorageEvent};

type Listener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Handle returned by `add_listener`, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Process-wide (or standalone) notification bus
///
/// ## Concurrency:
/// - `listeners`: RwLock, cloned out before invocation so a listener may
///   add or remove listeners, or call back into an engine
/// - `subscribers`: Mutex, disconnected senders are pruned on publish
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    subscribers: Mutex<Vec<Sender<StorageEvent>>>,
    next_listener_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus engines publish to by default
    pub fn global() -> Arc<EventBus> {
        static GLOBAL: OnceLock<Arc<EventBus>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(EventBus::new())))
    }

    /// Register a callback invoked synchronously for every event
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StorageEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Unregister a callback; returns false if it was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> Receiver<StorageEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Number of registered callbacks plus live subscribers
    pub fn observer_count(&self) -> usize {
        self.listeners.read().len() + self.subscribers.lock().len()
    }
}

impl NotificationSink for EventBus {
    fn publish(&self, event: &StorageEvent) {
        trace!(key = ?event.key, "Publishing storage event");

        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(event);
        }

        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
