//! Human-readable rendering of raw bytes.
//!
//! Findings carry raw byte windows; these helpers turn them into hex,
//! best-effort text and classic hex dumps. Text rendering never fails:
//! invalid UTF-8 is dropped, and a window with nothing decodable left is
//! shown as [`UNDECODABLE`].

mod writer;

use std::fmt::Write as _;

pub use writer::{FindingWriter, StatsWriter, TextWriter};

/// Placeholder shown for context that has no decodable text at all
pub const UNDECODABLE: &str = "<undecodable>";

/// Bytes per row in [`hex_dump`]
const DUMP_WIDTH: usize = 16;

/// Lowercase hex without separators
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode as UTF-8, silently dropping invalid sequences
pub fn lossy_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                // Incomplete sequence at the end: drop the remainder
                let skip = e.error_len().unwrap_or(after.len());
                rest = &after[skip..];
            }
        }
    }
}

/// Keep only the ASCII bytes
pub fn ascii_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect()
}

/// Best-effort text for display: escaped and quoted, or [`UNDECODABLE`]
pub fn display_text(bytes: &[u8]) -> String {
    let text = lossy_text(bytes);
    if text.is_empty() && !bytes.is_empty() {
        UNDECODABLE.to_string()
    } else {
        format!("{:?}", text)
    }
}

/// Classic hex dump: offset, sixteen hex bytes, printable ASCII gutter.
///
/// `base` is added to the row offsets so slices can be dumped at their
/// position in the original buffer.
pub fn hex_dump(bytes: &[u8], base: usize) -> String {
    let mut out = String::new();

    for (row, chunk) in bytes.chunks(DUMP_WIDTH).enumerate() {
        let _ = write!(out, "{:08x}  ", base + row * DUMP_WIDTH);
        for i in 0..DUMP_WIDTH {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02x} ", b);
                }
                None => out.push_str("   "),
            }
            if i == DUMP_WIDTH / 2 - 1 {
                out.push(' ');
            }
        }
        out.push('|');
        out.extend(chunk.iter().map(|&b| {
            if crate::strings::is_printable(b) {
                char::from(b)
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }

    out
}

#[cfg(feature = "serde")]
pub(crate) fn serialize_hex<S: serde::Serializer>(
    bytes: &bytes::Bytes,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex(bytes))
}
