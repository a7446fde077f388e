//! # ptxprobe-core
//!
//! Heuristic probing primitives for reverse-engineering undocumented binary
//! project files, such as Pro Tools `.ptx` sessions.
//!
//! This crate provides four independent, stateless primitives:
//! - Finding marker names stored as UTF-8 or UTF-16LE, with surrounding bytes
//! - Extracting the table of printable ASCII strings
//! - Guessing 32-bit sample-position fields in either byte order
//! - Locating the first divergence between a baseline file and a variant
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`buffer`]: File loading and context windows
//! - [`search`]: Marker name search
//! - [`strings`]: String table extraction
//! - [`fields`]: Sample-position field guessing
//! - [`diff`]: Baseline/variant comparison
//! - [`analysis`]: Header, strings and fields in one call
//! - [`render`]: Hex and text rendering of findings
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use ptxprobe_core::{load_file, BinaryDiff, MarkerSearch, DEFAULT_MARKER_TERMS};
//!
//! let empty = load_file("empty_test.ptx")?;
//! let markers = load_file("test_with_markers.ptx")?;
//!
//! for hit in MarkerSearch::new().find(&markers, DEFAULT_MARKER_TERMS) {
//!     println!("{} ({}) at {}", hit.term, hit.encoding, hit.position);
//! }
//!
//! let report = BinaryDiff::new().diff(&empty, &markers);
//! println!("first difference: {:?}", report.first_difference_offset());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`FindingWriter`]: Customize how findings are written

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod analysis;
pub mod buffer;
pub mod diff;
pub mod error;
pub mod fields;
pub mod render;
pub mod search;
pub mod strings;

// Re-export primary types for convenience
pub use analysis::{analyze_file, analyze_structure, StructureConfig, StructureReport};
pub use buffer::{load_file, HeaderPreview};
pub use diff::{diff_files, BinaryDiff, DiffConfig, DiffReport, Divergence, Side, TrailingBytes};
pub use error::{Error, Result};
pub use fields::{guess_fields_in_file, ByteOrder, CandidateField, FieldConfig, FieldGuesser};
pub use render::{FindingWriter, StatsWriter, TextWriter};
pub use search::{
    find_in_file, Encoding, MarkerSearch, Occurrence, SearchConfig, DEFAULT_MARKER_TERMS,
};
pub use strings::{extract_strings_from_file, ExtractedString, StringTableScanner, StringsConfig};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
