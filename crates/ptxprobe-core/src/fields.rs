//! Speculative sample-position field scanning.
//!
//! Walks the buffer in aligned 4-byte steps and reads each window as an
//! unsigned 32-bit integer in both byte orders. A reading is kept when it
//! looks like a sample-accurate timestamp inside a song: a positive count
//! below [`FieldConfig::max_raw`] that converts to strictly between
//! [`FieldConfig::min_seconds`] and [`FieldConfig::max_seconds`].
//!
//! This knows nothing about the real field layout and will flag unrelated
//! data that happens to fall in range. The output is a list of leads to
//! check against a second file, not a parse.

use crate::buffer::load_file;
use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 44_100.0;

/// Width of a candidate field in bytes
pub const FIELD_WIDTH: usize = 4;

/// Byte order a candidate was read in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// Byte orders in the order they are evaluated
    pub const ALL: [ByteOrder; 2] = [ByteOrder::Little, ByteOrder::Big];

    /// Read a `u32` from exactly four bytes
    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ByteOrder::Little => "LE",
            ByteOrder::Big => "BE",
        })
    }
}

/// A 4-byte window that reads as a plausible sample position
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CandidateField {
    /// Offset of the window
    pub offset: usize,
    /// The integer as read under `byte_order`
    pub raw_value: u32,
    /// Byte order used for the reading
    pub byte_order: ByteOrder,
    /// `raw_value` divided by the sample rate
    pub seconds: f64,
}

/// Configuration for [`FieldGuesser`]
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Sample rate used to convert counts to seconds
    pub sample_rate_hz: f64,
    /// Exclusive upper bound on the raw value
    pub max_raw: u32,
    /// Exclusive lower bound in seconds
    pub min_seconds: f64,
    /// Exclusive upper bound in seconds
    pub max_seconds: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            max_raw: 10_000_000,
            min_seconds: 10.0,
            max_seconds: 300.0,
        }
    }
}

impl FieldConfig {
    /// Creates a new field config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sample rate
    pub fn sample_rate_hz(mut self, rate: f64) -> Self {
        self.sample_rate_hz = rate;
        self
    }

    /// Sets the exclusive upper bound on raw values
    pub fn max_raw(mut self, max: u32) -> Self {
        self.max_raw = max;
        self
    }

    /// Sets the plausible duration window in seconds (both ends exclusive)
    pub fn seconds(mut self, min: f64, max: f64) -> Self {
        self.min_seconds = min;
        self.max_seconds = max;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(Error::invalid_sample_rate(self.sample_rate_hz));
        }
        // NaN bounds fail the comparison and are rejected too
        if !(self.min_seconds < self.max_seconds) {
            return Err(Error::invalid_bounds(self.min_seconds, self.max_seconds));
        }
        Ok(())
    }
}

/// Fixed-width integer scanner with a plausibility filter
#[derive(Debug, Clone, Default)]
pub struct FieldGuesser {
    config: FieldConfig,
}

impl FieldGuesser {
    /// Creates a new guesser at 44.1 kHz
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new guesser with custom configuration
    pub fn with_config(config: FieldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Whether `raw` reads as a sample position inside the configured window
    pub fn is_plausible(&self, raw: u32) -> bool {
        if raw == 0 || raw >= self.config.max_raw {
            return false;
        }
        let seconds = self.seconds(raw);
        self.config.min_seconds < seconds && seconds < self.config.max_seconds
    }

    fn seconds(&self, raw: u32) -> f64 {
        f64::from(raw) / self.config.sample_rate_hz
    }

    /// Scan every aligned 4-byte window under both byte orders.
    ///
    /// Results are ordered by offset, little-endian before big-endian at the
    /// same offset. Both readings are kept when both pass, even if equal.
    pub fn guess(&self, data: &[u8]) -> Vec<CandidateField> {
        let mut results = Vec::new();

        for (index, chunk) in data.chunks_exact(FIELD_WIDTH).enumerate() {
            let offset = index * FIELD_WIDTH;
            let window = [chunk[0], chunk[1], chunk[2], chunk[3]];

            for byte_order in ByteOrder::ALL {
                let raw_value = byte_order.read_u32(window);
                if self.is_plausible(raw_value) {
                    let seconds = self.seconds(raw_value);
                    trace!(
                        "Candidate at {} ({}): {} samples = {:.1}s",
                        offset,
                        byte_order,
                        raw_value,
                        seconds
                    );
                    results.push(CandidateField {
                        offset,
                        raw_value,
                        byte_order,
                        seconds,
                    });
                }
            }
        }

        debug!(
            "Found {} candidate field(s) in {} bytes",
            results.len(),
            data.len()
        );
        results
    }
}

/// Guess sample-position fields in a file at the given sample rate
pub fn guess_fields_in_file(
    path: impl AsRef<Path>,
    sample_rate_hz: f64,
) -> Result<Vec<CandidateField>> {
    let guesser = FieldGuesser::with_config(FieldConfig::new().sample_rate_hz(sample_rate_hz))?;
    let data = load_file(path)?;
    Ok(guesser.guess(&data))
}
