//! # Error Types
//!
//! This module defines error types used throughout the inkcraft library.
//!
//! Soft decode problems (truncated parameter blocks, unknown escape
//! sequences) are not errors. The tokenizer reports them as data.

use thiserror::Error;

/// Main error type for inkcraft operations
#[derive(Debug, Error)]
pub enum InkcraftError {
    /// A single captured packet could not be turned into bytes
    #[error("Malformed packet #{index}: {reason}")]
    MalformedPacket { index: usize, reason: String },

    /// The capture document as a whole is unusable
    #[error("Capture error: {0}")]
    Capture(String),

    /// Invalid command table entry
    #[error("Command table error: {0}")]
    Table(String),

    /// Export requested but no packet produced any command
    #[error("No parsed data to export")]
    NothingToExport,

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used by the library
pub type Result<T> = std::result::Result<T, InkcraftError>;
