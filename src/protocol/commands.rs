//! # ESC/P Command Codes
//!
//! Known command prefixes for the ESC/P2 dialect spoken by Epson F2100/F2130
//! DTG printers.
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Two bytes: `ESC @`, `ESC K`, `ESC $`
//! - Group-coded: `ESC ( X nL nH data...` where `nL nH` is the parameter
//!   block length
//!
//! ## Byte Order
//!
//! Parameter lengths use **little-endian** encoding:
//! - length 0x0102 is sent as bytes `[0x02, 0x01]`
//!
//! The list is based on the public ESC/P2 reference and still needs
//! validation against real DTG traffic. Codes observed in captures but not
//! listed here show up as unknown sequences in the parser statistics.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// Every ESC/P command begins with ESC (0x1B). Bytes outside an escape
/// sequence are payload and never decoded.
pub const ESC: u8 = 0x1B;

/// Group selector for `ESC ( X` commands
pub const GROUP: u8 = b'(';

/// Shortest valid prefix (ESC + one code byte)
pub const MIN_PREFIX_LEN: usize = 2;

/// Longest valid prefix
pub const MAX_PREFIX_LEN: usize = 5;

/// Description used for escape sequences with no table entry
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// BUILT-IN COMMAND LIST
// ============================================================================

/// # Built-in ESC/P Commands
///
/// | Prefix      | Command                        |
/// |-------------|--------------------------------|
/// | ESC @       | Initialize printer             |
/// | ESC ( G     | Select graphics mode           |
/// | ESC ( U     | Set unit                       |
/// | ESC $       | Set absolute horizontal position |
/// | ESC K       | Select single-density graphics |
///
/// (abridged, see the source for the full list)
pub const ESCP_COMMANDS: &[(&[u8], &str)] = &[
    (&[ESC, b'@'], "Initialize printer"),
    (&[ESC, GROUP, b'G'], "Select graphics mode"),
    (&[ESC, GROUP, b'U'], "Set unit"),
    (&[ESC, GROUP, b'K'], "Set color selection"),
    (&[ESC, GROUP, b'i'], "Set ink density/type"),
    (&[ESC, GROUP, b'c'], "Set page format"),
    (&[ESC, GROUP, b'C'], "Set page length"),
    (&[ESC, GROUP, b'V'], "Set absolute vertical position"),
    (&[ESC, GROUP, b'v'], "Set relative vertical position"),
    (&[ESC, GROUP, b'H'], "Set horizontal spacing"),
    (&[ESC, b'$'], "Set absolute horizontal position"),
    (&[ESC, b'\\'], "Set relative horizontal position"),
    (&[ESC, GROUP, b'R'], "Select print color"),
    (&[ESC, GROUP, b'r'], "Select color tables"),
    (&[ESC, b'.'], "Graphics dot control"),
    (&[ESC, b'*'], "Select bit image mode"),
    (&[ESC, b'K'], "Select single-density graphics"),
    (&[ESC, b'L'], "Select double-density graphics"),
    (&[ESC, b'Y'], "Select high-speed double-density graphics"),
    (&[ESC, b'Z'], "Select quadruple-density graphics"),
];

/// Render a prefix in protocol notation, e.g. `ESC ( G`.
///
/// Printable ASCII bytes are shown as characters, everything else as hex.
pub fn mnemonic(prefix: &[u8]) -> String {
    prefix
        .iter()
        .map(|&b| match b {
            ESC => "ESC".to_string(),
            0x21..=0x7E => (b as char).to_string(),
            _ => format!("{:02X}", b),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
