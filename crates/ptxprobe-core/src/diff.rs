//! Byte-wise comparison of a baseline file against a variant.
//!
//! Only the first divergence is located; the intent is to find where an
//! edit (adding markers, say) starts to disturb the layout, not to produce a
//! full delta. When the sizes differ the tail of the longer buffer is
//! reported as well, since appended sections usually land there.

use crate::buffer::{load_file, window_range};
use crate::error::Result;
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Default context radius around the first divergence
pub const DEFAULT_DIFF_RADIUS: usize = 20;

/// Default number of trailing bytes kept for display
pub const DEFAULT_TRAILING_PREVIEW: usize = 50;

/// One side of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Side {
    /// The baseline buffer
    A,
    /// The variant buffer
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::A => "A",
            Side::B => "B",
        })
    }
}

/// The first offset at which the buffers disagree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Divergence {
    /// Offset of the first differing byte
    pub offset: usize,
    /// Bytes of A around the offset
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::render::serialize_hex"))]
    pub context_a: Bytes,
    /// Bytes of B around the offset
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::render::serialize_hex"))]
    pub context_b: Bytes,
}

/// Bytes of the longer buffer past the end of the shorter one
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrailingBytes {
    /// Which buffer is longer
    pub side: Side,
    /// Length of the whole trailing region
    pub total_len: usize,
    /// The first bytes of the trailing region
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::render::serialize_hex"))]
    pub preview: Bytes,
    /// ASCII characters of the whole trailing region, non-ASCII bytes
    /// dropped, cut to the preview length
    pub ascii: String,
}

/// Result of comparing two buffers
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiffReport {
    /// Size of A in bytes
    pub size_a: usize,
    /// Size of B in bytes
    pub size_b: usize,
    /// `size_b - size_a`
    pub size_delta: i64,
    /// First differing offset within the common length, if any
    pub first_difference: Option<Divergence>,
    /// Tail of the longer buffer, present only when sizes differ
    pub trailing: Option<TrailingBytes>,
}

impl DiffReport {
    /// Offset of the first difference within the common length
    pub fn first_difference_offset(&self) -> Option<usize> {
        self.first_difference.as_ref().map(|d| d.offset)
    }

    /// Preview of the bytes B has beyond the end of A
    pub fn trailing_extra_bytes(&self) -> Option<&Bytes> {
        self.trailing
            .as_ref()
            .filter(|t| t.side == Side::B)
            .map(|t| &t.preview)
    }

    /// True when both buffers are byte-identical
    pub fn is_identical(&self) -> bool {
        self.size_delta == 0 && self.first_difference.is_none()
    }
}

/// Configuration for [`BinaryDiff`]
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Bytes of context on each side of the first divergence
    pub context_radius: usize,
    /// Maximum number of trailing bytes kept in the report
    pub trailing_preview: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_DIFF_RADIUS,
            trailing_preview: DEFAULT_TRAILING_PREVIEW,
        }
    }
}

impl DiffConfig {
    /// Creates a new diff config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the context radius
    pub fn context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    /// Sets the trailing preview length
    pub fn trailing_preview(mut self, len: usize) -> Self {
        self.trailing_preview = len;
        self
    }
}

/// Two-buffer byte-wise comparator
#[derive(Debug, Clone, Default)]
pub struct BinaryDiff {
    config: DiffConfig,
}

impl BinaryDiff {
    /// Creates a new comparator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new comparator with custom configuration
    pub fn with_config(config: DiffConfig) -> Self {
        Self { config }
    }

    /// Compare `a` (baseline) against `b` (variant)
    pub fn diff(&self, a: &Bytes, b: &Bytes) -> DiffReport {
        let common = a.len().min(b.len());

        let first_difference = a[..common]
            .iter()
            .zip(&b[..common])
            .position(|(x, y)| x != y)
            .map(|offset| {
                // Context stays within the common prefix on both sides
                let range = window_range(common, offset, 0, self.config.context_radius);
                Divergence {
                    offset,
                    context_a: a.slice(range.clone()),
                    context_b: b.slice(range),
                }
            });

        let trailing = match a.len().cmp(&b.len()) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Less => Some(self.trailing(Side::B, b, common)),
            std::cmp::Ordering::Greater => Some(self.trailing(Side::A, a, common)),
        };

        let report = DiffReport {
            size_a: a.len(),
            size_b: b.len(),
            size_delta: b.len() as i64 - a.len() as i64,
            first_difference,
            trailing,
        };

        debug!(
            "Compared {} and {} bytes: first difference {:?}",
            report.size_a,
            report.size_b,
            report.first_difference_offset()
        );
        report
    }

    fn trailing(&self, side: Side, longer: &Bytes, common: usize) -> TrailingBytes {
        let total_len = longer.len() - common;
        let end = common + total_len.min(self.config.trailing_preview);
        TrailingBytes {
            side,
            total_len,
            preview: longer.slice(common..end),
            ascii: longer[common..]
                .iter()
                .filter(|b| b.is_ascii())
                .take(self.config.trailing_preview)
                .map(|&b| char::from(b))
                .collect(),
        }
    }
}

/// Compare two files.
///
/// Fails with the error of the first file that cannot be read; no partial
/// report is produced.
pub fn diff_files(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<DiffReport> {
    let a = load_file(a)?;
    let b = load_file(b)?;
    Ok(BinaryDiff::new().diff(&a, &b))
}
