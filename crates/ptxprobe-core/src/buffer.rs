//! Loading files into memory and cutting context windows out of them.
//!
//! Every primitive in this crate works on a fully loaded, immutable buffer.
//! Buffers are [`Bytes`], so context windows handed back in findings are
//! zero-copy views into the caller's buffer rather than fresh allocations.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, trace};

/// Default number of header bytes shown by [`HeaderPreview`]
pub const DEFAULT_HEADER_LEN: usize = 100;

/// Read a whole file into an immutable buffer.
///
/// The file handle lives only for the duration of the read and is released
/// on every exit path, including failure.
pub fn load_file(path: impl AsRef<Path>) -> Result<Bytes> {
    let path = path.as_ref();
    trace!("Reading {}", path.display());
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    debug!("Loaded {} bytes from {}", data.len(), path.display());
    Ok(Bytes::from(data))
}

/// Byte range of a context window around `start..start + len`.
///
/// The window extends `radius` bytes on either side of the match and is
/// clamped to `0..limit`.
pub fn window_range(limit: usize, start: usize, len: usize, radius: usize) -> Range<usize> {
    let lo = start.saturating_sub(radius).min(limit);
    let hi = start
        .saturating_add(len)
        .saturating_add(radius)
        .min(limit)
        .max(lo);
    lo..hi
}

/// Cut a context window around `start..start + len` out of `data`.
pub fn context_window(data: &Bytes, start: usize, len: usize, radius: usize) -> Bytes {
    data.slice(window_range(data.len(), start, len, radius))
}

/// The first bytes of a buffer, kept for eyeballing magic numbers and
/// header layout.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderPreview {
    /// Total size of the buffer the preview was taken from
    pub total_len: usize,
    /// The leading bytes
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::render::serialize_hex"))]
    pub bytes: Bytes,
}

impl HeaderPreview {
    /// Take the first `len` bytes of `data` (fewer if the buffer is shorter)
    pub fn new(data: &Bytes, len: usize) -> Self {
        Self {
            total_len: data.len(),
            bytes: data.slice(..len.min(data.len())),
        }
    }

    /// Returns the previewed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
