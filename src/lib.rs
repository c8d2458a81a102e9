//! # shimstore
//!
//! A drop-in substitute for a browser-style key/value storage area, used
//! when the native implementation is missing or refuses writes:
//! - Same contract as the host API (`get_item`, `set_item`, `remove_item`,
//!   `clear`, `key`, `length`)
//! - Transparent delegation to the native backend while it works
//! - One-way switch to a self-managed table when it stops working
//! - Table persisted as JSON in a process-wide string slot after every
//!   mutation, so a reload can rebuild it
//! - Storage-change notifications on every observable mutation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application code                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    StorageEngine                             │
//! │              (Native ──once──▶ Fallback)                     │
//! └──────┬───────────────────────┬──────────────────────┬───────┘
//!        │                       │                      │
//!        ▼                       ▼                      ▼
//! ┌─────────────┐        ┌──────────────┐       ┌──────────────┐
//! │   Native    │        │ StorageTable │       │ Notification │
//! │   Backend   │        │  (fallback)  │       │     Sink     │
//! └─────────────┘        └──────┬───────┘       └──────────────┘
//!                               │
//!                               ▼
//!                       ┌──────────────┐
//!                       │ Persistence  │
//!                       │ Channel/Slot │
//!                       └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod table;
pub mod backend;
pub mod channel;
pub mod event;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ShimError, Result};
pub use config::{Config, RemoveNotification};
pub use engine::{BackendMode, StorageEngine, StorageKind};
pub use event::{EventBus, NotificationSink, StorageEvent};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of shimstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
