//! Slot codec
//!
//! JSON encoding of tables and the never-failing hydration path.

use tracing::{debug, warn};

use crate::error::{Result, ShimError};
use crate::table::StorageTable;

use super::PersistenceChannel;

/// Encode a table as a JSON object in enumeration order
pub fn encode_table(table: &StorageTable) -> Result<String> {
    Ok(serde_json::to_string(table)?)
}

/// Decode slot content into a table
///
/// Empty or whitespace-only content decodes as an empty table. Anything
/// that is not an object of string members is `MalformedState`.
pub fn decode_table(contents: &str) -> Result<StorageTable> {
    if contents.trim().is_empty() {
        return Ok(StorageTable::new());
    }

    serde_json::from_str(contents).map_err(|e| ShimError::MalformedState(e.to_string()))
}

/// Rebuild a table from a channel
///
/// Read and decode failures are logged and yield an empty table.
pub fn hydrate(channel: &dyn PersistenceChannel) -> StorageTable {
    let contents = match channel.read() {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            debug!("Persistence slot is empty, starting with an empty table");
            return StorageTable::new();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read persistence slot, starting empty");
            return StorageTable::new();
        }
    };

    match decode_table(&contents) {
        Ok(table) => {
            debug!(entries = table.len(), "Hydrated table from persistence slot");
            table
        }
        Err(e) => {
            warn!(error = %e, "Discarding unparsable persistence slot");
            StorageTable::new()
        }
    }
}
