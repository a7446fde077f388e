//! Byte encodings a search term is looked up under.
//!
//! Session files store labels either as plain 8-bit text or as UTF-16
//! little-endian code units, so every term is searched for twice.

use std::fmt;

/// Text encoding of a search pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Encoding {
    /// One byte per ASCII character (UTF-8)
    #[cfg_attr(feature = "serde", serde(rename = "UTF-8"))]
    Narrow,
    /// Two bytes per code unit, little-endian (UTF-16LE, no BOM)
    #[cfg_attr(feature = "serde", serde(rename = "UTF-16LE"))]
    WideLe,
}

impl Encoding {
    /// Encodings in the order they are searched
    pub const ALL: [Encoding; 2] = [Encoding::Narrow, Encoding::WideLe];

    /// Encode `term` into the byte pattern searched for
    pub fn encode(self, term: &str) -> Vec<u8> {
        match self {
            Encoding::Narrow => term.as_bytes().to_vec(),
            Encoding::WideLe => term.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }

    /// Conventional name of the encoding
    pub fn label(self) -> &'static str {
        match self {
            Encoding::Narrow => "UTF-8",
            Encoding::WideLe => "UTF-16LE",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
