//! # ESC/P Protocol Data
//!
//! Command codes and the lookup table the tokenizer matches against.
//!
//! ## Module Structure
//!
//! - [`commands`]: Escape constants and the built-in ESC/P command list
//! - [`table`]: Validated, injectable command table
//! - [`hexfmt`]: Hex text conversions used by capture and report files

pub mod commands;
pub mod hexfmt;
pub mod table;

pub use table::{CommandEntry, CommandTable};
