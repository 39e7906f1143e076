//! # Inkcraft - ESC/P Capture Analysis
//!
//! Inkcraft decodes ESC/P command streams captured from Epson F2100/F2130
//! DTG printers over USB. It provides:
//!
//! - **Command table**: known ESC prefixes and their meaning, loadable from JSON
//! - **Tokenizer**: longest-match decoding with parameter block extraction
//! - **Statistics**: command frequencies and unknown sequences across a capture
//! - **Capture/report I/O**: JSON capture ingestion and parsed-data export
//!
//! ## Quick Start
//!
//! ```
//! use inkcraft::{Aggregator, CommandTable, Tokenizer};
//!
//! let tokenizer = Tokenizer::new(CommandTable::escp());
//! let mut stats = Aggregator::new();
//!
//! // ESC @, an unknown ESC 0xFF, then ESC ( G with one parameter byte
//! let packet = [0x1B, 0x40, 0x1B, 0xFF, 0x1B, 0x28, 0x47, 0x01, 0x00, 0x01];
//! let commands = tokenizer.parse(&packet);
//! stats.record(&commands);
//!
//! let summary = stats.summary();
//! assert_eq!(summary.total_matched, 2);
//! assert_eq!(summary.unknown_count, 1);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Command codes and the command table |
//! | [`tokenizer`] | Escape sequence decoder |
//! | [`stats`] | Run-wide aggregation |
//! | [`capture`] | Capture file ingestion |
//! | [`report`] | Statistics text and JSON export |
//! | [`error`] | Error types |

pub mod capture;
pub mod error;
pub mod protocol;
pub mod report;
pub mod stats;
pub mod tokenizer;

// Re-exports for convenience
pub use error::InkcraftError;
pub use protocol::CommandTable;
pub use stats::Aggregator;
pub use tokenizer::Tokenizer;
