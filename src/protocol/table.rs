//! # Command Table
//!
//! Maps binary command prefixes (2 to 5 bytes, always starting with ESC) to
//! human-readable descriptions.
//!
//! The table is plain data. Tokenizer logic never changes when entries are
//! added, and several tables (one per device family, say) can coexist.
//!
//! ## File Format
//!
//! Tables can be loaded from JSON, keyed by hex prefix:
//!
//! ```json
//! {
//!   "commands": {
//!     "1B 40": "Initialize printer",
//!     "1B 28 47": "Select graphics mode"
//!   }
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use inkcraft::protocol::CommandTable;
//!
//! let table = CommandTable::escp();
//! let buf = [0x1B, 0x28, 0x47, 0x01, 0x00, 0x01];
//! assert_eq!(table.lookup(&buf, 0, 3), Some("Select graphics mode"));
//! assert_eq!(table.lookup(&buf, 0, 2), None);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::commands::{ESC, ESCP_COMMANDS, MAX_PREFIX_LEN, MIN_PREFIX_LEN};
use super::hexfmt;
use crate::error::{InkcraftError, Result};

/// One validated table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub prefix: Vec<u8>,
    pub description: String,
}

impl CommandEntry {
    pub fn new(prefix: impl Into<Vec<u8>>, description: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            description: description.into(),
        }
    }
}

/// Immutable prefix → description mapping
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: BTreeMap<Vec<u8>, String>,
}

/// On-disk shape of a table file
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    commands: BTreeMap<String, String>,
}

impl CommandTable {
    /// Build a table, rejecting invalid or duplicate prefixes.
    pub fn new(entries: impl IntoIterator<Item = CommandEntry>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            validate_prefix(&entry.prefix)?;
            if map.contains_key(&entry.prefix) {
                return Err(InkcraftError::Table(format!(
                    "duplicate prefix {}",
                    hexfmt::spaced(&entry.prefix)
                )));
            }
            map.insert(entry.prefix, entry.description);
        }
        Ok(Self { entries: map })
    }

    /// The built-in ESC/P table for Epson DTG printers.
    pub fn escp() -> Self {
        let entries = ESCP_COMMANDS
            .iter()
            .map(|(prefix, description)| (prefix.to_vec(), description.to_string()))
            .collect();
        Self { entries }
    }

    /// Load a table from its JSON file format.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TableFile = serde_json::from_str(json)?;
        let entries = file
            .commands
            .into_iter()
            .map(|(key, description)| {
                let prefix = hexfmt::decode(&key)
                    .map_err(|e| InkcraftError::Table(format!("prefix '{}': {}", key, e)))?;
                Ok(CommandEntry::new(prefix, description))
            })
            .collect::<Result<Vec<_>>>()?;

        let table = Self::new(entries)?;
        debug!(entries = table.len(), "loaded command table");
        Ok(table)
    }

    /// Serialize to the JSON file format.
    pub fn to_json(&self) -> Result<String> {
        let file = TableFile {
            commands: self
                .entries
                .iter()
                .map(|(prefix, description)| (hexfmt::spaced(prefix), description.clone()))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Exact match of `buffer[position..position + length]`.
    ///
    /// Returns `None` when the slice runs past the end of the buffer.
    pub fn lookup(&self, buffer: &[u8], position: usize, length: usize) -> Option<&str> {
        let end = position.checked_add(length)?;
        let slice = buffer.get(position..end)?;
        self.get(slice)
    }

    pub fn get(&self, prefix: &[u8]) -> Option<&str> {
        self.entries.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending prefix order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &str)> {
        self.entries
            .iter()
            .map(|(prefix, description)| (prefix.as_slice(), description.as_str()))
    }
}

fn validate_prefix(prefix: &[u8]) -> Result<()> {
    if !(MIN_PREFIX_LEN..=MAX_PREFIX_LEN).contains(&prefix.len()) {
        return Err(InkcraftError::Table(format!(
            "prefix '{}' is {} bytes, expected {} to {}",
            hexfmt::spaced(prefix),
            prefix.len(),
            MIN_PREFIX_LEN,
            MAX_PREFIX_LEN
        )));
    }
    if prefix[0] != ESC {
        return Err(InkcraftError::Table(format!(
            "prefix '{}' does not start with ESC",
            hexfmt::spaced(prefix)
        )));
    }
    Ok(())
}
