//! In-process slots
//!
//! `SharedSlot` is the ambient string slot; `SlotRegistry` hands out slots
//! by name so every engine asking for the same name shares one.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};

use crate::error::Result;

use super::PersistenceChannel;

/// Cloneable in-memory string slot
#[derive(Debug, Clone, Default)]
pub struct SharedSlot {
    contents: Arc<RwLock<Option<String>>>,
}

impl SharedSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot holding `contents`
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let slot = Self::new();
        *slot.contents.write() = Some(contents.into());
        slot
    }

    /// Current content, if any
    pub fn get(&self) -> Option<String> {
        self.contents.read().clone()
    }

    /// Replace the content
    pub fn set(&self, contents: impl Into<String>) {
        *self.contents.write() = Some(contents.into());
    }

    /// Drop the content
    pub fn reset(&self) {
        *self.contents.write() = None;
    }
}

impl PersistenceChannel for SharedSlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.get())
    }

    fn write(&self, contents: &str) -> Result<()> {
        self.set(contents);
        Ok(())
    }
}

/// Named slots
#[derive(Debug, Default)]
pub struct SlotRegistry {
    slots: Mutex<HashMap<String, SharedSlot>>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> &'static SlotRegistry {
        static GLOBAL: OnceLock<SlotRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SlotRegistry::new)
    }

    /// Get the slot named `name`, creating an empty one on first use
    pub fn slot(&self, name: &str) -> SharedSlot {
        self.slots
            .lock()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    /// Check whether a slot with this name has been created
    pub fn contains(&self, name: &str) -> bool {
        self.slots.lock().contains_key(name)
    }
}
