//! Engine Module
//!
//! The storage engine that offers the host key/value contract over either
//! a native backend or a self-managed table.
//!
//! ## Responsibilities
//! - Delegate to the native backend while it accepts writes
//! - Switch to fallback mode, once and for good, when it rejects one
//! - Keep the fallback table persisted in its channel after every mutation
//! - Publish a change notification for every observable fallback mutation

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::backend::{BackendError, BackendResult, NativeBackend};
use crate::channel::{self, PersistenceChannel, SlotRegistry};
use crate::config::{Config, RemoveNotification};
use crate::error::ShimError;
use crate::event::{EventBus, NotificationSink, StorageArea, StorageEvent};
use crate::table::StorageTable;

/// Source of process-unique engine ids
static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Storage Kind
// =============================================================================

/// Which of the two storage scopes an engine represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Lives as long as the browsing context
    Session,

    /// Outlives the browsing context
    Local,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Session => "session",
            StorageKind::Local => "local",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = ShimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" | "sessionStorage" => Ok(StorageKind::Session),
            "local" | "localStorage" => Ok(StorageKind::Local),
            other => Err(ShimError::Config(format!(
                "Unknown storage kind '{}', expected 'session' or 'local'",
                other
            ))),
        }
    }
}

// =============================================================================
// Mode
// =============================================================================

/// Externally visible backend mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Native,
    Fallback,
}

/// Internal mode; the only transition is `Native` → `Fallback`
enum Mode {
    Native(Box<dyn NativeBackend>),
    Fallback,
}

/// Everything a mutation touches, guarded together
struct State {
    mode: Mode,

    /// Authoritative only in fallback mode
    table: StorageTable,
}

/// Check that a native backend accepts writes
///
/// Writes the probe key and removes it again. Hosts in private modes expose
/// a storage object whose writes throw; this is how they are told apart.
/// A value already stored under the probe key is written back afterwards.
pub fn probe_native(backend: &mut dyn NativeBackend, probe_key: &str) -> BackendResult<()> {
    let existing = backend.get_item(probe_key);
    backend.set_item(probe_key, probe_key)?;
    match existing {
        Some(value) => backend.set_item(probe_key, &value),
        None => backend.remove_item(probe_key),
    }
}

/// Ordered copy of everything a native backend exposes
fn native_entries(backend: &dyn NativeBackend) -> Vec<(String, String)> {
    (0..backend.length())
        .filter_map(|index| {
            let key = backend.key(index)?;
            let value = backend.get_item(&key)?;
            Some((key, value))
        })
        .collect()
}

// =============================================================================
// Engine
// =============================================================================

/// Key/value storage engine
///
/// ## Concurrency Model
///
/// The host contract is single-threaded and synchronous; every operation
/// runs to completion before returning. The engine takes `&self` and keeps
/// its mode and table behind one `Mutex`, so it can be shared through `Arc`
/// and concurrent callers are serialized.
///
/// Mutations additionally hold a re-entrant writer lock from before the
/// commit until their notification is published. Events therefore reach the
/// sink in commit order, and a listener may still write to the engine from
/// the publishing thread.
///
/// ## Mutation Order (fallback mode)
///
/// 1. Take the writer lock, then the state lock
/// 2. Update the table (size follows the table)
/// 3. Persist the table to the channel
/// 4. Release the state lock
/// 5. Publish the notification, then release the writer lock
///
/// Listeners therefore only ever see committed state and may call back into
/// the engine.
pub struct StorageEngine {
    kind: StorageKind,
    id: u64,
    config: Config,
    channel: Arc<dyn PersistenceChannel>,
    sink: Arc<dyn NotificationSink>,

    /// Held across commit and publication; always taken before `state`
    writer: ReentrantMutex<()>,
    state: Mutex<State>,
}

impl StorageEngine {
    /// Start building an engine of the given kind
    pub fn builder(kind: StorageKind) -> EngineBuilder {
        EngineBuilder::new(kind)
    }

    /// Create a fallback engine on the process-wide slot and event bus
    ///
    /// The slot is the one `config` names for `kind`; its current content
    /// is hydrated into the table.
    pub fn create(kind: StorageKind, config: Config) -> Self {
        Self::builder(kind).config(config).build()
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Number of keys currently stored
    pub fn length(&self) -> usize {
        let state = self.state.lock();
        match &state.mode {
            Mode::Native(backend) => backend.length(),
            Mode::Fallback => state.table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Key at `index` in enumeration order, `None` past the end
    pub fn key(&self, index: usize) -> Option<String> {
        let state = self.state.lock();
        match &state.mode {
            Mode::Native(backend) => backend.key(index),
            Mode::Fallback => state.table.key(index).map(str::to_string),
        }
    }

    /// Value stored under `key`
    pub fn get_item(&self, key: &str) -> Option<String> {
        let state = self.state.lock();
        match &state.mode {
            Mode::Native(backend) => backend.get_item(key),
            Mode::Fallback => state.table.get(key).map(str::to_string),
        }
    }

    /// Ordered copy of all entries
    pub fn entries(&self) -> Vec<(String, String)> {
        let state = self.state.lock();
        match &state.mode {
            Mode::Native(backend) => native_entries(&**backend),
            Mode::Fallback => state
                .table
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    // =========================================================================
    // Mutation Operations
    // =========================================================================

    /// Store `value` under `key`, both coerced to strings
    ///
    /// Writing the value a key already holds is a no-op in fallback mode:
    /// no notification, no persistence write.
    pub fn set_item(&self, key: impl ToString, value: impl ToString) {
        let key = key.to_string();
        let value = value.to_string();
        let _writer = self.writer.lock();

        let old_value = {
            let mut state = self.state.lock();

            if self.delegate(&mut state, "set_item", |b| b.set_item(&key, &value)) {
                trace!(key = %key, "set_item delegated to native storage");
                return;
            }

            if state.table.get(&key) == Some(value.as_str()) {
                trace!(key = %key, "set_item with unchanged value, nothing to do");
                return;
            }

            let old_value = state.table.insert(key.clone(), value.clone());
            self.persist(&state.table);
            old_value
        };

        debug!(kind = %self.kind, key = %key, "Stored item in fallback table");
        self.notify(Some(key), old_value, Some(value));
    }

    /// Remove `key` if present
    ///
    /// Whether removing an absent key notifies is governed by
    /// `Config::remove_notification`.
    pub fn remove_item(&self, key: &str) {
        let _writer = self.writer.lock();

        let old_value = {
            let mut state = self.state.lock();

            if self.delegate(&mut state, "remove_item", |b| b.remove_item(key)) {
                trace!(key = %key, "remove_item delegated to native storage");
                return;
            }

            let old_value = state.table.remove(key);
            self.persist(&state.table);
            old_value
        };

        let notify = old_value.is_some()
            || self.config.remove_notification == RemoveNotification::Always;

        debug!(kind = %self.kind, key = %key, existed = old_value.is_some(), "Removed item from fallback table");

        if notify {
            self.notify(Some(key.to_string()), old_value, None);
        }
    }

    /// Remove every key
    ///
    /// In fallback mode this always notifies, even if the table was empty.
    pub fn clear(&self) {
        let _writer = self.writer.lock();

        {
            let mut state = self.state.lock();

            if self.delegate(&mut state, "clear", |b| b.clear()) {
                trace!("clear delegated to native storage");
                return;
            }

            state.table.clear();
            self.persist(&state.table);
        }

        debug!(kind = %self.kind, "Cleared fallback table");
        self.notify(None, None, None);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run a write against the native backend if there still is one
    ///
    /// Returns true if the backend accepted the write. A rejection switches
    /// the engine to fallback mode and returns false, so the caller goes on
    /// to apply the write to the table.
    fn delegate<F>(&self, state: &mut State, op: &'static str, write: F) -> bool
    where
        F: FnOnce(&mut dyn NativeBackend) -> BackendResult<()>,
    {
        let Mode::Native(backend) = &mut state.mode else {
            return false;
        };

        match write(&mut **backend) {
            Ok(()) => true,
            Err(e) => {
                self.enter_fallback(state, op, &e);
                false
            }
        }
    }

    /// Native → Fallback, exactly once
    fn enter_fallback(&self, state: &mut State, op: &'static str, error: &BackendError) {
        let previous = std::mem::replace(&mut state.mode, Mode::Fallback);

        warn!(
            kind = %self.kind,
            engine_id = self.id,
            op,
            error = %error,
            "Native storage rejected a write, switching to fallback mode"
        );

        if let Mode::Native(backend) = previous {
            if self.config.migrate_on_fallback {
                state.table = native_entries(&*backend).into_iter().collect();
                debug!(entries = state.table.len(), "Copied native contents into fallback table");
                self.persist(&state.table);
            }
        }
    }

    /// Write the table to the channel
    ///
    /// A channel error is logged; the in-memory commit stands.
    fn persist(&self, table: &StorageTable) {
        let result = channel::encode_table(table).and_then(|encoded| self.channel.write(&encoded));

        if let Err(e) = result {
            warn!(
                kind = %self.kind,
                engine_id = self.id,
                error = %e,
                "Failed to persist fallback table, keeping in-memory state"
            );
        }
    }

    fn notify(&self, key: Option<String>, old_value: Option<String>, new_value: Option<String>) {
        let event = StorageEvent::new(self.area(), self.config.url.as_str(), key, old_value, new_value);
        self.sink.publish(&event);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Process-unique id of this engine
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The `storage_area` this engine stamps on its events
    pub fn area(&self) -> StorageArea {
        StorageArea {
            kind: self.kind,
            engine_id: self.id,
        }
    }

    /// Current backend mode
    pub fn mode(&self) -> BackendMode {
        match self.state.lock().mode {
            Mode::Native(_) => BackendMode::Native,
            Mode::Fallback => BackendMode::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.mode() == BackendMode::Fallback
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageEngine")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("mode", &self.mode())
            .field("length", &self.length())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for StorageEngine
///
/// Defaults: no native backend, the process-wide slot named by the config
/// for this kind, and the process-wide event bus.
pub struct EngineBuilder {
    kind: StorageKind,
    config: Config,
    native: Option<Box<dyn NativeBackend>>,
    channel: Option<Arc<dyn PersistenceChannel>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl EngineBuilder {
    fn new(kind: StorageKind) -> Self {
        Self {
            kind,
            config: Config::default(),
            native: None,
            channel: None,
            sink: None,
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Offer a native backend; it is probed before being used
    pub fn native(mut self, backend: impl NativeBackend + 'static) -> Self {
        self.native = Some(Box::new(backend));
        self
    }

    /// Set the persistence channel
    pub fn channel(mut self, channel: impl PersistenceChannel + 'static) -> Self {
        self.channel = Some(Arc::new(channel));
        self
    }

    /// Set the notification sink
    pub fn sink(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Decide the mode and, in fallback mode, hydrate from the channel
    pub fn build(self) -> StorageEngine {
        let EngineBuilder {
            kind,
            config,
            native,
            channel,
            sink,
        } = self;

        let id = NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed);

        let channel: Arc<dyn PersistenceChannel> = match channel {
            Some(channel) => channel,
            None => Arc::new(SlotRegistry::global().slot(config.slot_name(kind))),
        };

        let sink: Arc<dyn NotificationSink> = match sink {
            Some(sink) => sink,
            None => EventBus::global(),
        };

        let mode = match native {
            Some(mut backend) => match probe_native(&mut *backend, &config.probe_key) {
                Ok(()) => {
                    info!(kind = %kind, engine_id = id, "Native storage available, delegating");
                    Mode::Native(backend)
                }
                // A full store still serves its contents; the first rejected
                // write takes the regular transition
                Err(e @ BackendError::QuotaExceeded { .. }) => {
                    info!(kind = %kind, engine_id = id, error = %e, "Native storage full, delegating until a write is rejected");
                    Mode::Native(backend)
                }
                Err(e) => {
                    info!(kind = %kind, engine_id = id, error = %e, "Native storage unusable, using fallback");
                    Mode::Fallback
                }
            },
            None => {
                info!(kind = %kind, engine_id = id, "No native storage, using fallback");
                Mode::Fallback
            }
        };

        let table = match mode {
            Mode::Fallback => channel::hydrate(channel.as_ref()),
            Mode::Native(_) => StorageTable::new(),
        };

        StorageEngine {
            kind,
            id,
            config,
            channel,
            sink,
            writer: ReentrantMutex::new(()),
            state: Mutex::new(State { mode, table }),
        }
    }
}
