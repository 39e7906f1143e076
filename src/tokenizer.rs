//! # ESC/P Tokenizer
//!
//! Greedy longest-match decoding of escape sequences in a byte buffer.
//!
//! ## Algorithm
//!
//! ```text
//! byte != ESC          → skip 1 byte
//! ESC, table hit len 2 → simple command, skip 2
//! ESC, table hit len≥3 → compound command, read nL nH and the parameter
//!                        block if it fits, otherwise skip the prefix only
//! ESC, no hit          → unknown, skip 1 byte
//! ```
//!
//! Candidate lengths are tried 5, 4, 3, 2 so that a compound command is
//! never taken for a shorter command sharing its first bytes.
//!
//! Each buffer is decoded on its own. A command split across two packets is
//! not reassembled.
//!
//! ## Example
//!
//! ```
//! use inkcraft::protocol::CommandTable;
//! use inkcraft::tokenizer::{CommandKind, Tokenizer};
//!
//! let tokenizer = Tokenizer::new(CommandTable::escp());
//! // ESC @, then ESC ( U with a one-byte parameter block
//! let commands = tokenizer.parse(&[0x1B, 0x40, 0x1B, 0x28, 0x55, 0x01, 0x00, 0x0A]);
//!
//! assert_eq!(commands.len(), 2);
//! assert_eq!(commands[0].kind, CommandKind::Simple);
//! assert_eq!(commands[1].offset, 2);
//! assert_eq!(commands[1].parameters, vec![0x0A]);
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::capture::{CapturedPacket, PacketMeta};
use crate::protocol::CommandTable;
use crate::protocol::commands::{ESC, MAX_PREFIX_LEN, MIN_PREFIX_LEN, UNKNOWN};

/// How a [`DecodedCommand`] was recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Two-byte table hit, never carries parameters
    Simple,
    /// Three to five byte table hit, may carry a parameter block
    Compound,
    /// Escape sequence with no table entry
    Unknown,
}

/// One decoded (or unrecognized) escape sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedCommand {
    /// Position of the ESC byte in the buffer
    pub offset: usize,
    /// Matched prefix, or up to two bytes at `offset` for unknowns
    pub prefix: Vec<u8>,
    pub description: String,
    pub parameters: Vec<u8>,
    pub kind: CommandKind,
}

impl DecodedCommand {
    pub fn is_unknown(&self) -> bool {
        self.kind == CommandKind::Unknown
    }

    /// Bytes this command consumed from the buffer.
    ///
    /// Unknowns consume one byte even though their prefix shows two.
    pub fn span(&self) -> usize {
        match self.kind {
            CommandKind::Unknown => 1,
            _ if self.parameters.is_empty() => self.prefix.len(),
            _ => self.prefix.len() + 2 + self.parameters.len(),
        }
    }
}

/// Decoded output for one captured packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPacket {
    pub meta: PacketMeta,
    pub commands: Vec<DecodedCommand>,
}

/// Stateless decoder over an injected command table.
///
/// Cloning is cheap and shares the table, so one tokenizer can be handed
/// to many threads.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    table: Arc<CommandTable>,
}

impl Tokenizer {
    pub fn new(table: impl Into<Arc<CommandTable>>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Decode every escape sequence in `buf`.
    ///
    /// Never fails: truncated parameter blocks degrade to parameter-less
    /// commands and unmatched sequences are returned as
    /// [`CommandKind::Unknown`] records.
    pub fn parse(&self, buf: &[u8]) -> Vec<DecodedCommand> {
        let mut commands = Vec::new();
        let mut i = 0;

        while i < buf.len() {
            if buf[i] != ESC {
                i += 1;
                continue;
            }

            match self.match_at(buf, i) {
                Some((len, description)) => {
                    let (kind, parameters) = if len > MIN_PREFIX_LEN {
                        (CommandKind::Compound, parameter_block(buf, i + len))
                    } else {
                        (CommandKind::Simple, None)
                    };

                    let command = DecodedCommand {
                        offset: i,
                        prefix: buf[i..i + len].to_vec(),
                        description: description.to_string(),
                        parameters: parameters.map(<[u8]>::to_vec).unwrap_or_default(),
                        kind,
                    };
                    i += command.span();
                    commands.push(command);
                }
                None => {
                    let end = (i + 2).min(buf.len());
                    commands.push(DecodedCommand {
                        offset: i,
                        prefix: buf[i..end].to_vec(),
                        description: UNKNOWN.to_string(),
                        parameters: Vec::new(),
                        kind: CommandKind::Unknown,
                    });
                    i += 1;
                }
            }
        }

        commands
    }

    /// Decode a captured packet, carrying its metadata through.
    pub fn parse_packet(&self, packet: CapturedPacket) -> ParsedPacket {
        ParsedPacket {
            commands: self.parse(&packet.data),
            meta: packet.meta,
        }
    }

    /// Longest table hit at `pos`, returning its length and description.
    fn match_at(&self, buf: &[u8], pos: usize) -> Option<(usize, &str)> {
        let max = MAX_PREFIX_LEN.min(buf.len() - pos);
        (MIN_PREFIX_LEN..=max)
            .rev()
            .find_map(|len| self.table.lookup(buf, pos, len).map(|d| (len, d)))
    }
}

/// Parameter block starting at `start` (the `nL nH` length field).
///
/// `None` when the length field is missing, zero, or declares more bytes
/// than the buffer holds.
fn parameter_block(buf: &[u8], start: usize) -> Option<&[u8]> {
    let field = buf.get(start..start + 2)?;
    let n = u16::from_le_bytes([field[0], field[1]]) as usize;
    if n == 0 {
        return None;
    }
    buf.get(start + 2..start + 2 + n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CommandEntry;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn escp() -> Tokenizer {
        Tokenizer::new(CommandTable::escp())
    }

    fn kinds(commands: &[DecodedCommand]) -> Vec<(usize, CommandKind)> {
        commands.iter().map(|c| (c.offset, c.kind)).collect()
    }

    #[test]
    fn test_skips_plain_bytes() {
        assert!(escp().parse(b"hello world").is_empty());
        assert!(escp().parse(&[]).is_empty());
    }

    #[test]
    fn test_simple_command() {
        let commands = escp().parse(&[0x00, 0x1B, 0x40, 0x00]);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].offset, 1);
        assert_eq!(commands[0].prefix, vec![0x1B, 0x40]);
        assert_eq!(commands[0].description, "Initialize printer");
        assert_eq!(commands[0].kind, CommandKind::Simple);
        assert!(commands[0].parameters.is_empty());
    }

    #[test]
    fn test_simple_command_ignores_following_length_bytes() {
        // ESC K followed by what would look like a length field
        let commands = escp().parse(&[0x1B, b'K', 0x01, 0x00, 0x1B, 0x40]);
        assert_eq!(
            kinds(&commands),
            vec![(0, CommandKind::Simple), (4, CommandKind::Simple)]
        );
        assert!(commands[0].parameters.is_empty());
    }

    #[test]
    fn test_compound_parameters() {
        // ESC ( G, length 3, payload contains an ESC @ that must not decode
        let buf = [0x1B, 0x28, 0x47, 0x03, 0x00, 0x1B, 0x40, 0x01, 0x1B, 0x40];
        let commands = escp().parse(&buf);

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].kind, CommandKind::Compound);
        assert_eq!(commands[0].parameters, vec![0x1B, 0x40, 0x01]);
        assert_eq!(commands[0].span(), 8);
        assert_eq!(commands[1].offset, 8);
    }

    #[test]
    fn test_parameter_length_is_little_endian() {
        let mut buf = vec![0x1B, 0x28, 0x43, 0x00, 0x01];
        buf.extend(std::iter::repeat_n(0xAA, 256));
        let commands = escp().parse(&buf);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].parameters.len(), 256);
    }

    #[test]
    fn test_zero_length_block() {
        // Length field 0: the prefix alone is consumed, the zero bytes are skipped as payload
        let commands = escp().parse(&[0x1B, 0x28, 0x55, 0x00, 0x00, 0x1B, 0x40]);
        assert_eq!(
            kinds(&commands),
            vec![(0, CommandKind::Compound), (5, CommandKind::Simple)]
        );
        assert!(commands[0].parameters.is_empty());
        assert_eq!(commands[0].span(), 3);
    }

    #[test]
    fn test_truncated_parameter_block() {
        // Declares 16 bytes, only 2 present; the ESC @ inside is then decoded
        let buf = [0x1B, 0x28, 0x55, 0x10, 0x00, 0x1B, 0x40];
        let commands = escp().parse(&buf);
        assert_eq!(
            kinds(&commands),
            vec![(0, CommandKind::Compound), (5, CommandKind::Simple)]
        );
        assert!(commands[0].parameters.is_empty());
    }

    #[test]
    fn test_length_field_cut_off() {
        for buf in [&[0x1B, 0x28, 0x55][..], &[0x1B, 0x28, 0x55, 0x01][..]] {
            let commands = escp().parse(buf);
            assert_eq!(commands.len(), 1);
            assert!(commands[0].parameters.is_empty());
        }
    }

    #[test]
    fn test_longest_match_wins() {
        let table = CommandTable::new([
            CommandEntry::new(vec![ESC, b'('], "short"),
            CommandEntry::new(vec![ESC, b'(', b'X', b'Y', b'Z'], "long"),
        ])
        .unwrap();
        let commands = Tokenizer::new(table).parse(&[ESC, b'(', b'X', b'Y', b'Z']);

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].description, "long");
        assert_eq!(commands[0].prefix.len(), 5);
    }

    #[test]
    fn test_shorter_match_when_long_does_not_fit() {
        let table = CommandTable::new([
            CommandEntry::new(vec![ESC, b'('], "short"),
            CommandEntry::new(vec![ESC, b'(', b'X', b'Y', b'Z'], "long"),
        ])
        .unwrap();
        let commands = Tokenizer::new(table).parse(&[ESC, b'(', b'X', b'Y']);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].description, "short");
    }

    #[test]
    fn test_unknown_resynchronizes() {
        let commands = escp().parse(&[0x1B, 0xFF, 0x1B, 0x40]);
        assert_eq!(
            kinds(&commands),
            vec![(0, CommandKind::Unknown), (2, CommandKind::Simple)]
        );
        assert_eq!(commands[0].prefix, vec![0x1B, 0xFF]);
        assert_eq!(commands[0].description, UNKNOWN);
    }

    #[test]
    fn test_unknown_overlapping_escapes() {
        // ESC ESC @: the first ESC is unknown, the second starts ESC @
        let commands = escp().parse(&[0x1B, 0x1B, 0x40]);
        assert_eq!(
            kinds(&commands),
            vec![(0, CommandKind::Unknown), (1, CommandKind::Simple)]
        );
        assert_eq!(commands[0].prefix, vec![0x1B, 0x1B]);
    }

    #[test]
    fn test_unknown_at_tail() {
        let commands = escp().parse(&[0x00, 0x1B]);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].prefix, vec![0x1B]);
        assert!(commands[0].is_unknown());
    }

    #[test]
    fn test_parse_packet_keeps_meta() {
        let meta = PacketMeta {
            timestamp: "2024-01-01 00:00:00".into(),
            direction: "OUT".into(),
        };
        let parsed = escp().parse_packet(CapturedPacket::new(meta.clone(), vec![0x1B, 0x40]));
        assert_eq!(parsed.meta, meta);
        assert_eq!(parsed.commands.len(), 1);
    }

    /// Buffers dense in escape bytes and table codes
    fn escp_ish() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(
            prop_oneof![
                3 => Just(ESC),
                2 => Just(b'('),
                1 => prop::sample::select(b"@GUK$\\.*LYZ".to_vec()),
                2 => 0u8..4,
                2 => any::<u8>(),
            ],
            0..64,
        )
    }

    proptest! {
        #[test]
        fn prop_spans_tile_buffer(buf in escp_ish()) {
            let commands = escp().parse(&buf);
            let mut cursor = 0;
            for command in &commands {
                // Gaps are plain bytes that were skipped
                prop_assert!(command.offset >= cursor);
                prop_assert!(buf[cursor..command.offset].iter().all(|&b| b != ESC));
                prop_assert_eq!(buf[command.offset], ESC);
                cursor = command.offset + command.span();
                prop_assert!(cursor <= buf.len());
            }
            prop_assert!(buf[cursor..].iter().all(|&b| b != ESC));
            prop_assert!(commands.len() <= buf.len());
        }

        #[test]
        fn prop_parameter_extraction(
            code in prop::sample::select(b"GUKicCVvHRr".to_vec()),
            payload in prop::collection::vec(any::<u8>(), 1..300),
            tail in prop::collection::vec(any::<u8>(), 0..8),
        ) {
            let n = payload.len() as u16;
            let mut buf = vec![ESC, b'(', code];
            buf.extend(n.to_le_bytes());
            buf.extend(&payload);
            buf.extend(&tail);

            let commands = escp().parse(&buf);
            prop_assert_eq!(&commands[0].parameters, &payload);
            if let Some(next) = commands.get(1) {
                prop_assert!(next.offset >= 3 + 2 + payload.len());
            }
        }

        #[test]
        fn prop_truncation_is_safe(
            code in prop::sample::select(b"GUKicCVvHRr".to_vec()),
            declared in (2u16..1000).prop_filter("length bytes must not be ESC", |d| {
                !d.to_le_bytes().contains(&ESC)
            }),
            present in 0usize..2,
        ) {
            let mut buf = vec![ESC, b'(', code];
            buf.extend(declared.to_le_bytes());
            buf.extend(std::iter::repeat_n(0x00, present));

            let commands = escp().parse(&buf);
            prop_assert_eq!(commands.len(), 1);
            prop_assert!(commands[0].parameters.is_empty());
        }
    }
}
