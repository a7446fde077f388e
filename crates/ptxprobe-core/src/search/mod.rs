//! Marker name search over raw session bytes.
//!
//! Each term is encoded twice (see [`Encoding`]) and every occurrence of
//! either pattern is reported together with a window of surrounding bytes.
//!
//! ## Algorithm Overview
//!
//! 1. Encode the term as UTF-8 and as UTF-16LE
//! 2. Find the next occurrence at or after the current offset
//! 3. Record it with its context window
//! 4. Resume the search one byte past the start of the hit
//!
//! Resuming one byte past the *start* means overlapping hits are all
//! reported: `"aa"` occurs twice in `"aaa"`.

mod encoding;

use crate::buffer::{context_window, load_file};
use crate::error::Result;
use bytes::Bytes;
use memchr::memmem;
use std::path::Path;
use tracing::{debug, trace};

pub use encoding::Encoding;

/// Marker names searched for when the caller supplies none
pub const DEFAULT_MARKER_TERMS: &[&str] = &["Intro", "Verse 1", "Chorus", "Outro"];

/// Default number of bytes kept on each side of a hit
pub const DEFAULT_CONTEXT_RADIUS: usize = 50;

/// A single hit of a search term
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Occurrence {
    /// The term as supplied by the caller
    pub term: String,
    /// Encoding of the pattern that matched
    pub encoding: Encoding,
    /// Byte offset of the first byte of the match
    pub position: usize,
    /// Length of the encoded pattern in bytes
    pub len: usize,
    /// Bytes around the match, clamped to the buffer
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::render::serialize_hex"))]
    pub context: Bytes,
}

impl Occurrence {
    /// Returns the context window as a slice
    pub fn context(&self) -> &[u8] {
        &self.context
    }
}

/// Configuration for [`MarkerSearch`]
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Bytes of context kept before and after each match
    pub context_radius: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            context_radius: DEFAULT_CONTEXT_RADIUS,
        }
    }
}

impl SearchConfig {
    /// Creates a new search config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the context radius
    pub fn context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }
}

/// Dual-encoding substring locator
#[derive(Debug, Clone, Default)]
pub struct MarkerSearch {
    config: SearchConfig,
}

impl MarkerSearch {
    /// Creates a new search with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new search with custom configuration
    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Find every occurrence of every term.
    ///
    /// Results are ordered by term (caller order), then encoding
    /// ([`Encoding::ALL`] order), then ascending position. Nothing is
    /// deduplicated. An empty term matches at every offset from 0 through
    /// the buffer length, once per encoding.
    pub fn find<S: AsRef<str>>(&self, data: &Bytes, terms: &[S]) -> Vec<Occurrence> {
        let mut results = Vec::new();

        debug!("Searching {} bytes for {} term(s)", data.len(), terms.len());

        for term in terms {
            let term = term.as_ref();

            for encoding in Encoding::ALL {
                let pattern = encoding.encode(term);
                for position in overlapping_positions(data, &pattern) {
                    trace!("Found {:?} ({}) at position {}", term, encoding, position);
                    results.push(Occurrence {
                        term: term.to_string(),
                        encoding,
                        position,
                        len: pattern.len(),
                        context: context_window(
                            data,
                            position,
                            pattern.len(),
                            self.config.context_radius,
                        ),
                    });
                }
            }
        }

        debug!("Search complete: {} occurrence(s)", results.len());
        results
    }
}

/// Lazy iterator over the start offsets of `needle` in `haystack`,
/// overlapping hits included.
#[derive(Debug, Clone)]
pub struct Positions<'h> {
    finder: memmem::Finder<'static>,
    haystack: &'h [u8],
    offset: usize,
}

impl Iterator for Positions<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let remaining = self.haystack.get(self.offset..)?;
        let position = self.offset + self.finder.find(remaining)?;
        self.offset = position + 1;
        Some(position)
    }
}

/// Iterate over every start offset of `needle` in `haystack`, advancing one
/// byte past each hit's start.
pub fn overlapping_positions<'h>(haystack: &'h [u8], needle: &[u8]) -> Positions<'h> {
    Positions {
        finder: memmem::Finder::new(needle).into_owned(),
        haystack,
        offset: 0,
    }
}

/// Search a file for marker names.
///
/// This is a convenience function that reads the file and searches it.
pub fn find_in_file<S: AsRef<str>>(path: impl AsRef<Path>, terms: &[S]) -> Result<Vec<Occurrence>> {
    let data = load_file(path)?;
    Ok(MarkerSearch::new().find(&data, terms))
}

/// Search a file with custom configuration
pub fn find_in_file_with_config<S: AsRef<str>>(
    path: impl AsRef<Path>,
    terms: &[S],
    config: SearchConfig,
) -> Result<Vec<Occurrence>> {
    let data = load_file(path)?;
    Ok(MarkerSearch::with_config(config).find(&data, terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn positions(found: &[Occurrence], encoding: Encoding) -> Vec<usize> {
        found
            .iter()
            .filter(|o| o.encoding == encoding)
            .map(|o| o.position)
            .collect()
    }

    #[test]
    fn test_overlapping_positions() {
        let hits: Vec<usize> = overlapping_positions(b"aaaa", b"aa").collect();
        assert_eq!(hits, vec![0, 1, 2]);
        assert_eq!(overlapping_positions(b"abc", b"zz").count(), 0);
    }

    #[test]
    fn test_overlap_is_preserved() {
        let data = Bytes::from_static(b"aaa");
        let found = MarkerSearch::new().find(&data, &["aa"]);
        assert_eq!(positions(&found, Encoding::Narrow), vec![0, 1]);
        assert!(positions(&found, Encoding::WideLe).is_empty());
    }

    #[test]
    fn test_finds_both_encodings() {
        let mut raw = b"\x00\x00Chorus\x00\x00".to_vec();
        let wide_at = raw.len();
        raw.extend_from_slice(&Encoding::WideLe.encode("Chorus"));
        let data = Bytes::from(raw);

        let found = MarkerSearch::new().find(&data, &["Chorus"]);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].encoding, Encoding::Narrow);
        assert_eq!(found[0].position, 2);
        assert_eq!(found[0].len, 6);
        assert_eq!(found[1].encoding, Encoding::WideLe);
        assert_eq!(found[1].position, wide_at);
        assert_eq!(found[1].len, 12);
    }

    #[test]
    fn test_result_order_follows_terms_then_encoding() {
        let mut raw = Encoding::WideLe.encode("Outro");
        raw.extend_from_slice(b"..Intro..Outro..Intro");
        let data = Bytes::from(raw);

        let found = MarkerSearch::new().find(&data, &["Outro", "Intro"]);
        let summary: Vec<(&str, Encoding, usize)> = found
            .iter()
            .map(|o| (o.term.as_str(), o.encoding, o.position))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Outro", Encoding::Narrow, 19),
                ("Outro", Encoding::WideLe, 0),
                ("Intro", Encoding::Narrow, 12),
                ("Intro", Encoding::Narrow, 26),
            ]
        );
    }

    #[test]
    fn test_context_window_clamped() {
        let mut raw = vec![0xAA; 60];
        raw.extend_from_slice(b"Intro");
        raw.extend_from_slice(&[0xBB; 10]);
        let data = Bytes::from(raw);

        let found = MarkerSearch::new().find(&data, &["Intro"]);
        assert_eq!(found.len(), 1);
        // 50 bytes before, the match, and the 10 bytes that remain after it
        assert_eq!(found[0].context().len(), 50 + 5 + 10);
        assert_eq!(&found[0].context()[50..55], b"Intro");
    }

    #[test]
    fn test_custom_context_radius() {
        let data = Bytes::from_static(b"xxxxIntroyyyy");
        let search = MarkerSearch::with_config(SearchConfig::new().context_radius(2));
        let found = search.find(&data, &["Intro"]);
        assert_eq!(found[0].context(), b"xxIntroyy");
    }

    #[test]
    fn test_empty_term_matches_every_offset() {
        let data = Bytes::from_static(b"abc");
        let found = MarkerSearch::new().find(&data, &[""]);
        assert_eq!(found.len(), 8);
        assert_eq!(positions(&found, Encoding::Narrow), vec![0, 1, 2, 3]);
        assert_eq!(positions(&found, Encoding::WideLe), vec![0, 1, 2, 3]);
        assert!(found.iter().all(|o| o.len == 0 && o.context() == b"abc"));
    }

    #[test]
    fn test_empty_buffer() {
        assert!(MarkerSearch::new().find(&Bytes::new(), &["Intro"]).is_empty());
        assert_eq!(MarkerSearch::new().find(&Bytes::new(), &[""]).len(), 2);
    }

    #[test]
    fn test_search_is_repeatable() {
        let data = Bytes::from_static(b"Verse 1 Verse 1 Verse 11");
        let search = MarkerSearch::new();
        assert_eq!(
            search.find(&data, DEFAULT_MARKER_TERMS),
            search.find(&data, DEFAULT_MARKER_TERMS)
        );
    }
}
