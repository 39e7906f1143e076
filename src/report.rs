//! # Reports
//!
//! Human-readable statistics and the JSON export of a parsing run.
//!
//! ## Export Layout
//!
//! ```json
//! {
//!   "generated": "2024-05-01T12:00:00+00:00",
//!   "statistics": {
//!     "total_commands": 3,
//!     "unique_commands": 2,
//!     "unknown_commands": 1,
//!     "command_frequency": {"1b40": 2, "1b2847": 1}
//!   },
//!   "unknown_commands": ["1bff"],
//!   "parsed_data": [
//!     {
//!       "timestamp": "...",
//!       "direction": "OUT",
//!       "parsed_commands": [
//!         {"position": 0, "command": "1b40", "description": "Initialize printer", "parameters": ""}
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{InkcraftError, Result};
use crate::protocol::CommandTable;
use crate::protocol::commands::{UNKNOWN, mnemonic};
use crate::protocol::hexfmt;
use crate::stats::Aggregator;
use crate::tokenizer::{DecodedCommand, ParsedPacket};

/// Unknown sequences listed in the text report
const UNKNOWN_PREVIEW: usize = 10;

const RULE: &str = "--------------------------------------------------";

/// Full export document
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub generated: String,
    pub statistics: ExportStatistics,
    pub unknown_commands: Vec<String>,
    pub parsed_data: Vec<ExportPacket>,
}

#[derive(Debug, Serialize)]
pub struct ExportStatistics {
    pub total_commands: u64,
    pub unique_commands: usize,
    pub unknown_commands: usize,
    pub command_frequency: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub struct ExportPacket {
    pub timestamp: String,
    pub direction: String,
    pub parsed_commands: Vec<ExportCommand>,
}

#[derive(Debug, Serialize)]
pub struct ExportCommand {
    pub position: usize,
    pub command: String,
    pub description: String,
    pub parameters: String,
}

impl From<&DecodedCommand> for ExportCommand {
    fn from(command: &DecodedCommand) -> Self {
        Self {
            position: command.offset,
            command: hexfmt::encode(&command.prefix),
            description: command.description.clone(),
            parameters: hexfmt::encode(&command.parameters),
        }
    }
}

impl ExportDocument {
    /// Assemble the export. Packets that decoded to nothing are left out.
    pub fn build(packets: &[ParsedPacket], stats: &Aggregator) -> Result<Self> {
        let parsed_data: Vec<ExportPacket> = packets
            .iter()
            .filter(|p| !p.commands.is_empty())
            .map(|p| ExportPacket {
                timestamp: p.meta.timestamp.clone(),
                direction: p.meta.direction.clone(),
                parsed_commands: p.commands.iter().map(ExportCommand::from).collect(),
            })
            .collect();

        if parsed_data.is_empty() {
            return Err(InkcraftError::NothingToExport);
        }

        let summary = stats.summary();
        Ok(Self {
            generated: chrono::Local::now().to_rfc3339(),
            statistics: ExportStatistics {
                total_commands: summary.total_matched,
                unique_commands: summary.unique_commands,
                unknown_commands: summary.unknown_count,
                command_frequency: stats
                    .frequency()
                    .iter()
                    .map(|(prefix, count)| (hexfmt::encode(prefix), *count))
                    .collect(),
            },
            unknown_commands: stats
                .unknown_sequences()
                .iter()
                .map(|seq| hexfmt::encode(seq))
                .collect(),
            parsed_data,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), packets = self.parsed_data.len(), "saved parsed data");
        Ok(())
    }
}

/// Text block with totals, frequency list and a preview of unknowns.
pub fn render_statistics(stats: &Aggregator, table: &CommandTable) -> String {
    let summary = stats.summary();
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "Command Statistics:");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Total parsed command sequences: {}", summary.total_matched);
    let _ = writeln!(out, "Unique command types: {}", summary.unique_commands);
    let _ = writeln!(out, "Unknown command sequences: {}", summary.unknown_count);

    if !summary.frequency_table.is_empty() {
        let _ = writeln!(out, "\nCommand Frequency:");
        let _ = writeln!(out, "{}", RULE);
        for (prefix, count) in &summary.frequency_table {
            let description = table.get(prefix).unwrap_or(UNKNOWN);
            let _ = writeln!(
                out,
                "{:<10} : {:<5} : {:<10} : {}",
                hexfmt::encode(prefix),
                count,
                mnemonic(prefix),
                description
            );
        }
    }

    if !stats.unknown_sequences().is_empty() {
        let _ = writeln!(out, "\nUnknown Commands (first {}):", UNKNOWN_PREVIEW);
        let _ = writeln!(out, "{}", RULE);
        for (i, seq) in stats.unknown_sequences().iter().take(UNKNOWN_PREVIEW).enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, hexfmt::encode(seq));
        }
    }

    out
}
