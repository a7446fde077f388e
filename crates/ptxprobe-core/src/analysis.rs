//! One-call structure survey of a single buffer.
//!
//! Chains the independent primitives the way an interactive session would:
//! look at the header, pull out the string table, then list candidate
//! sample positions. No primitive sees another's output.

use crate::buffer::{load_file, HeaderPreview, DEFAULT_HEADER_LEN};
use crate::error::Result;
use crate::fields::{CandidateField, FieldConfig, FieldGuesser};
use crate::strings::{ExtractedString, StringTableScanner, StringsConfig};
use bytes::Bytes;
use std::path::Path;

/// Configuration for [`analyze_structure`]
#[derive(Debug, Clone)]
pub struct StructureConfig {
    /// Number of leading bytes kept in the header preview
    pub header_len: usize,
    /// String table settings
    pub strings: StringsConfig,
    /// Sample-position settings
    pub fields: FieldConfig,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            header_len: DEFAULT_HEADER_LEN,
            strings: StringsConfig::default(),
            fields: FieldConfig::default(),
        }
    }
}

/// Everything the structure survey found
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructureReport {
    /// Leading bytes of the buffer
    pub header: HeaderPreview,
    /// Printable runs, by offset
    pub strings: Vec<ExtractedString>,
    /// Plausible sample positions, by offset
    pub fields: Vec<CandidateField>,
}

/// Survey a loaded buffer
pub fn analyze_structure(data: &Bytes, config: &StructureConfig) -> Result<StructureReport> {
    let guesser = FieldGuesser::with_config(config.fields.clone())?;
    Ok(StructureReport {
        header: HeaderPreview::new(data, config.header_len),
        strings: StringTableScanner::with_config(config.strings.clone()).extract(data),
        fields: guesser.guess(data),
    })
}

/// Survey a file with default settings
pub fn analyze_file(path: impl AsRef<Path>) -> Result<StructureReport> {
    let data = load_file(path)?;
    analyze_structure(&data, &StructureConfig::default())
}
