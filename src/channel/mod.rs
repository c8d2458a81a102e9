//! Persistence Channel Module
//!
//! The string slot a fallback engine serializes its table into.
//!
//! ## Responsibilities
//! - Hold one string per slot, shared process-wide by name
//! - Survive across engine instances (a reload rebuilds from the slot)
//! - Encode tables as JSON objects and decode them back
//!
//! ## Slot Format
//! ```text
//! {"first-key":"value","second-key":"value", ...}
//! ```
//! Member order is the table's enumeration order. Anything that does not
//! parse as an object of strings hydrates as an empty table.

pub mod codec;
mod file;
mod slot;

pub use codec::{decode_table, encode_table, hydrate};
pub use file::FileSlot;
pub use slot::{SharedSlot, SlotRegistry};

use crate::error::Result;

/// A single string-valued slot
pub trait PersistenceChannel: Send + Sync {
    /// Current slot content, `None` if nothing has been written
    fn read(&self) -> Result<Option<String>>;

    /// Replace the slot content
    fn write(&self, contents: &str) -> Result<()>;
}
