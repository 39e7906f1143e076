//! Hex text helpers shared by the capture reader, table files and reports.

/// Decode hex text as written by capture tools and humans.
///
/// Accepts `1b40`, `1B 40`, `1b:40` and `0x1B 0x40`. Tokens are separated by
/// whitespace, colons or commas, each may carry a `0x` prefix.
pub fn decode(text: &str) -> Result<Vec<u8>, String> {
    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|tok| {
            tok.strip_prefix("0x")
                .or_else(|| tok.strip_prefix("0X"))
                .unwrap_or(tok)
        })
        .collect();

    hex::decode(&digits).map_err(|e| {
        let shown: String = text.chars().take(50).collect();
        format!("could not parse hex data '{}': {}", shown, e)
    })
}

/// Lowercase hex without separators, the export format.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Space separated uppercase pairs, the table file format (`1B 28 47`).
pub fn spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
