//! Extensible finding writers.
//!
//! This module provides the [`FindingWriter`] trait for customizing how
//! findings are written to output.

use super::{ascii_text, display_text, hex_dump, to_hex};
use crate::buffer::HeaderPreview;
use crate::diff::{DiffReport, Side};
use crate::fields::CandidateField;
use crate::search::Occurrence;
use crate::strings::ExtractedString;
use std::fmt::{Result, Write};

/// Trait for writing findings to output.
///
/// Every method defaults to doing nothing, so an implementation only needs
/// to handle the record kinds it cares about.
///
/// # Example
///
/// ```
/// use ptxprobe_core::render::FindingWriter;
/// use ptxprobe_core::search::Occurrence;
///
/// #[derive(Default)]
/// struct PositionCollector {
///     positions: Vec<usize>,
/// }
///
/// impl FindingWriter for PositionCollector {
///     fn write_occurrence(&mut self, occurrence: &Occurrence) -> std::fmt::Result {
///         self.positions.push(occurrence.position);
///         Ok(())
///     }
/// }
/// ```
pub trait FindingWriter {
    /// Write the leading bytes of a file
    fn write_header(&mut self, header: &HeaderPreview) -> Result {
        let _ = header;
        Ok(())
    }

    /// Write a marker search hit
    fn write_occurrence(&mut self, occurrence: &Occurrence) -> Result {
        let _ = occurrence;
        Ok(())
    }

    /// Write an extracted string
    fn write_string(&mut self, string: &ExtractedString) -> Result {
        let _ = string;
        Ok(())
    }

    /// Write a candidate sample-position field
    fn write_field(&mut self, field: &CandidateField) -> Result {
        let _ = field;
        Ok(())
    }

    /// Write a comparison report
    fn write_diff(&mut self, report: &DiffReport) -> Result {
        let _ = report;
        Ok(())
    }
}

/// A writer that counts findings by kind
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsWriter {
    /// Number of headers
    pub header_count: usize,
    /// Number of marker occurrences
    pub occurrence_count: usize,
    /// Number of extracted strings
    pub string_count: usize,
    /// Number of candidate fields
    pub field_count: usize,
    /// Number of comparisons
    pub diff_count: usize,
}

impl FindingWriter for StatsWriter {
    fn write_header(&mut self, _header: &HeaderPreview) -> Result {
        self.header_count += 1;
        Ok(())
    }

    fn write_occurrence(&mut self, _occurrence: &Occurrence) -> Result {
        self.occurrence_count += 1;
        Ok(())
    }

    fn write_string(&mut self, _string: &ExtractedString) -> Result {
        self.string_count += 1;
        Ok(())
    }

    fn write_field(&mut self, _field: &CandidateField) -> Result {
        self.field_count += 1;
        Ok(())
    }

    fn write_diff(&mut self, _report: &DiffReport) -> Result {
        self.diff_count += 1;
        Ok(())
    }
}

/// Plain-text report writer
#[derive(Debug, Default)]
pub struct TextWriter {
    output: String,
}

impl TextWriter {
    /// Creates an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text written so far
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Consumes the writer and returns its text
    pub fn finish(self) -> String {
        self.output
    }

    /// Append a free-form line (section titles and the like)
    pub fn line(&mut self, text: impl AsRef<str>) -> Result {
        writeln!(self.output, "{}", text.as_ref())
    }
}

impl FindingWriter for TextWriter {
    fn write_header(&mut self, header: &HeaderPreview) -> Result {
        let n = header.bytes.len();
        writeln!(self.output, "File size: {} bytes", header.total_len)?;
        writeln!(self.output, "First {} bytes (hex): {}", n, to_hex(&header.bytes))?;
        writeln!(
            self.output,
            "First {} bytes (ascii): {:?}",
            n,
            ascii_text(&header.bytes)
        )?;
        self.output.push_str(&hex_dump(&header.bytes, 0));
        Ok(())
    }

    fn write_occurrence(&mut self, occurrence: &Occurrence) -> Result {
        writeln!(
            self.output,
            "Marker: {} ({})",
            occurrence.term, occurrence.encoding
        )?;
        writeln!(self.output, "Position: {}", occurrence.position)?;
        writeln!(self.output, "Context (hex): {}", to_hex(occurrence.context()))?;
        writeln!(
            self.output,
            "Context (text): {}",
            display_text(occurrence.context())
        )
    }

    fn write_string(&mut self, string: &ExtractedString) -> Result {
        writeln!(self.output, "  {:6}: {:?}", string.start_offset, string.text)
    }

    fn write_field(&mut self, field: &CandidateField) -> Result {
        writeln!(
            self.output,
            "  Position {:6}: {:10} samples = {:6.1} seconds ({})",
            field.offset, field.raw_value, field.seconds, field.byte_order
        )
    }

    fn write_diff(&mut self, report: &DiffReport) -> Result {
        writeln!(self.output, "File 1 size: {} bytes", report.size_a)?;
        writeln!(self.output, "File 2 size: {} bytes", report.size_b)?;
        writeln!(self.output, "Size difference: {} bytes", report.size_delta)?;

        match &report.first_difference {
            Some(divergence) => {
                writeln!(self.output, "First difference at byte {}", divergence.offset)?;
                writeln!(self.output, "File 1 context: {}", to_hex(&divergence.context_a))?;
                writeln!(self.output, "File 2 context: {}", to_hex(&divergence.context_b))?;
            }
            None if report.is_identical() => writeln!(self.output, "Files are identical")?,
            None => writeln!(self.output, "No difference within the common length")?,
        }

        if let Some(trailing) = &report.trailing {
            let file = match trailing.side {
                Side::A => 1,
                Side::B => 2,
            };
            let ellipsis = if trailing.preview.len() < trailing.total_len {
                "..."
            } else {
                ""
            };
            writeln!(
                self.output,
                "Extra data in file {} ({} bytes):",
                file, trailing.total_len
            )?;
            writeln!(self.output, "Hex: {}{}", to_hex(&trailing.preview), ellipsis)?;
            writeln!(self.output, "ASCII: {:?}", trailing.ascii)?;
        }

        Ok(())
    }
}
