//! Table Module
//!
//! In-memory key/value table backing an engine in fallback mode.
//!
//! ## Responsibilities
//! - Map string keys to string values
//! - Preserve insertion order (it defines `key(index)` enumeration)
//! - Keep positions stable across value-only updates
//! - Serialize as a JSON object whose member order is the enumeration order
//!
//! ## Data Structure Choice
//! Entries live in a `Vec` in enumeration order with a `HashMap` index
//! from key to position:
//! - O(1) lookups, positional access and overwrites
//! - O(n) removal (positions after the removed key shift down by one)
//! - Tables mirror host storage areas, which stay small

mod ordered;

pub use ordered::{StorageTable, TableIter};
