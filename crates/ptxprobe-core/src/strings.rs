//! Printable string table extraction.
//!
//! A single left-to-right pass with two states: inside a run of printable
//! ASCII (`0x20..=0x7E`) or outside one. Any other byte, the null terminator
//! included, ends the run. Runs of at least [`StringsConfig::min_len`] bytes
//! are kept; a run still open at the end of the buffer is evaluated the same
//! way.

use crate::buffer::load_file;
use crate::error::Result;
use std::path::Path;
use tracing::{debug, trace};

/// Shortest run reported by default (runs must be longer than two bytes)
pub const DEFAULT_MIN_STRING_LEN: usize = 3;

/// A printable run found in the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtractedString {
    /// Offset of the first byte of the run
    pub start_offset: usize,
    /// The run decoded as ASCII text
    pub text: String,
}

impl ExtractedString {
    /// Offset one past the last byte of the run
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.text.len()
    }
}

/// Configuration for [`StringTableScanner`]
#[derive(Debug, Clone)]
pub struct StringsConfig {
    /// Minimum run length in bytes
    pub min_len: usize,
}

impl Default for StringsConfig {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_STRING_LEN,
        }
    }
}

impl StringsConfig {
    /// Creates a new strings config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum run length
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = len;
        self
    }
}

/// Contiguous printable-byte run extractor
#[derive(Debug, Clone, Default)]
pub struct StringTableScanner {
    config: StringsConfig,
}

/// Returns true for bytes in the printable ASCII band
#[inline]
pub fn is_printable(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte)
}

impl StringTableScanner {
    /// Creates a new scanner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: StringsConfig) -> Self {
        Self { config }
    }

    /// Extract every printable run, ordered by start offset
    pub fn extract(&self, data: &[u8]) -> Vec<ExtractedString> {
        let mut results = Vec::new();
        let mut run_start: Option<usize> = None;

        for (i, &byte) in data.iter().enumerate() {
            match (run_start, is_printable(byte)) {
                (None, true) => run_start = Some(i),
                (Some(start), false) => {
                    self.flush(data, start, i, &mut results);
                    run_start = None;
                }
                _ => {}
            }
        }

        if let Some(start) = run_start {
            self.flush(data, start, data.len(), &mut results);
        }

        debug!("Extracted {} string(s) from {} bytes", results.len(), data.len());
        results
    }

    fn flush(&self, data: &[u8], start: usize, end: usize, out: &mut Vec<ExtractedString>) {
        let run = &data[start..end];
        if run.len() < self.config.min_len.max(1) {
            return;
        }
        // The printable band is pure ASCII; a failed decode just drops the run
        match std::str::from_utf8(run) {
            Ok(text) if text.is_ascii() => {
                trace!("String at {}: {:?}", start, text);
                out.push(ExtractedString {
                    start_offset: start,
                    text: text.to_string(),
                });
            }
            _ => trace!("Skipping undecodable run at {}", start),
        }
    }
}

/// Extract the string table of a file
pub fn extract_strings_from_file(path: impl AsRef<Path>) -> Result<Vec<ExtractedString>> {
    let data = load_file(path)?;
    Ok(StringTableScanner::new().extract(&data))
}
