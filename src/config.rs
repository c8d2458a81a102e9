//! Configuration for shimstore
//!
//! Centralized configuration with sensible defaults.

use crate::engine::StorageKind;

/// Main configuration shared by the engines of one process
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Channel Configuration
    // -------------------------------------------------------------------------
    /// Slot name the session-flavored engine persists into
    pub session_slot: String,

    /// Slot name the persistent-flavored engine persists into
    pub local_slot: String,

    // -------------------------------------------------------------------------
    // Notification Configuration
    // -------------------------------------------------------------------------
    /// Document URL reported in every change notification
    pub url: String,

    /// Whether removing an absent key still notifies
    pub remove_notification: RemoveNotification,

    // -------------------------------------------------------------------------
    // Backend Configuration
    // -------------------------------------------------------------------------
    /// Reserved key written and removed to probe a native backend
    pub probe_key: String,

    /// Copy native contents into the table when a write failure forces
    /// the switch to fallback mode
    pub migrate_on_fallback: bool,
}

/// Notification policy for `remove_item` on a key that is not present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveNotification {
    /// Notify only when a key was actually removed (native contract)
    IfPresent,

    /// Notify on every call, with null old and new values for absent keys
    Always,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_slot: "__shimstore_session__".to_string(),
            local_slot: "__shimstore_local__".to_string(),
            url: "about:blank".to_string(),
            remove_notification: RemoveNotification::IfPresent,
            probe_key: "__shimstore_probe__".to_string(),
            migrate_on_fallback: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Slot name used by engines of the given kind
    pub fn slot_name(&self, kind: StorageKind) -> &str {
        match kind {
            StorageKind::Session => &self.session_slot,
            StorageKind::Local => &self.local_slot,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the slot name for session-flavored engines
    pub fn session_slot(mut self, name: impl Into<String>) -> Self {
        self.config.session_slot = name.into();
        self
    }

    /// Set the slot name for persistent-flavored engines
    pub fn local_slot(mut self, name: impl Into<String>) -> Self {
        self.config.local_slot = name.into();
        self
    }

    /// Set the URL carried by change notifications
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the notification policy for removing absent keys
    pub fn remove_notification(mut self, policy: RemoveNotification) -> Self {
        self.config.remove_notification = policy;
        self
    }

    /// Set the reserved key used by the native availability probe
    pub fn probe_key(mut self, key: impl Into<String>) -> Self {
        self.config.probe_key = key.into();
        self
    }

    /// Enable or disable copying native contents on fallback transition
    pub fn migrate_on_fallback(mut self, enabled: bool) -> Self {
        self.config.migrate_on_fallback = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
