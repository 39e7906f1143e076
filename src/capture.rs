//! # Capture Ingestion
//!
//! Turns saved USB captures into typed byte buffers for the tokenizer.
//!
//! ## Supported Inputs
//!
//! | Input | Shape |
//! |-------|-------|
//! | JSON capture | `{"packets": [{"timestamp", "direction", "data"}]}` |
//! | Raw dump | the file bytes, parsed as a single packet |
//!
//! In JSON captures a packet's `data` may be a hex string (`"1b 40"`,
//! `"1b:40"`), a list of byte values (`[27, 64]`), or the `{"hex": ...}`
//! object written by Wireshark-assisted captures.
//!
//! A packet that cannot be decoded is returned as an error in its slot so
//! the caller can skip it and keep going. Capture data is noisy.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InkcraftError, Result};
use crate::protocol::hexfmt;

/// Opaque per-packet metadata, passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketMeta {
    pub timestamp: String,
    pub direction: String,
}

/// One packet's worth of input for the tokenizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedPacket {
    pub meta: PacketMeta,
    pub data: Vec<u8>,
}

impl CapturedPacket {
    pub fn new(meta: PacketMeta, data: impl Into<Vec<u8>>) -> Self {
        Self {
            meta,
            data: data.into(),
        }
    }
}

/// Per-packet decode outcome, in capture order
pub type PacketResult = Result<CapturedPacket>;

/// Read a capture file from disk.
///
/// With `raw` set the file content is the packet itself.
pub fn read_file(path: &Path, raw: bool) -> Result<Vec<PacketResult>> {
    if raw {
        let data = fs::read(path)?;
        return Ok(vec![Ok(CapturedPacket::new(PacketMeta::default(), data))]);
    }
    let text = fs::read_to_string(path)?;
    load_json(&text)
}

/// Parse a JSON capture document.
///
/// Fails as a whole only when the text is not JSON or has no `packets`
/// array. Packets without a `data` field are skipped.
pub fn load_json(text: &str) -> Result<Vec<PacketResult>> {
    let doc: Value = serde_json::from_str(text)?;
    let packets = doc
        .get("packets")
        .and_then(Value::as_array)
        .ok_or_else(|| InkcraftError::Capture("invalid file format: no packets array".into()))?;

    Ok(packets
        .iter()
        .enumerate()
        .filter_map(|(index, packet)| decode_packet(index, packet))
        .collect())
}

fn decode_packet(index: usize, packet: &Value) -> Option<PacketResult> {
    let malformed = |reason: String| InkcraftError::MalformedPacket { index, reason };

    let Some(obj) = packet.as_object() else {
        return Some(Err(malformed("packet is not an object".into())));
    };
    let data = obj.get("data")?;

    let meta = PacketMeta {
        timestamp: text_field(obj.get("timestamp")),
        direction: text_field(obj.get("direction")),
    };

    Some(decode_data(data).map_err(malformed).map(|bytes| CapturedPacket::new(meta, bytes)))
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn decode_data(data: &Value) -> std::result::Result<Vec<u8>, String> {
    match data {
        Value::String(hex) => hexfmt::decode(hex),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| format!("byte value out of range: {}", item))
            })
            .collect(),
        Value::Object(dump) => match dump.get("hex") {
            Some(Value::String(hex)) => hexfmt::decode(hex),
            _ => Err("data object has no hex field".into()),
        },
        other => Err(format!("unsupported data format: {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
