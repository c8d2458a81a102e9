//! Error types for shimstore
//!
//! Provides a unified error type for channel, codec and configuration
//! operations. Storage operations themselves never return these: every
//! failure there degrades the engine's mode or state instead.

use thiserror::Error;

/// Result type alias using ShimError
pub type Result<T> = std::result::Result<T, ShimError>;

/// Unified error type for shimstore operations
#[derive(Debug, Error)]
pub enum ShimError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel content exists but is not a serialized table
    #[error("Malformed persisted state: {0}")]
    MalformedState(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
