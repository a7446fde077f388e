//! Error types for the ptxprobe-core library.
//!
//! Only failures that a caller can act on are represented here. Text that
//! fails to decode while scanning or rendering is never an error: the
//! affected run is skipped, or its context is rendered with a fallback marker.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ptxprobe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all ptxprobe operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Sample rate is zero, negative or not a finite number
    #[error("invalid sample rate {rate}: must be a finite number greater than zero")]
    InvalidSampleRate {
        /// The rejected sample rate in Hz
        rate: f64,
    },

    /// Plausibility window is empty or inverted
    #[error("invalid plausibility window: minimum {min} must be below maximum {max}")]
    InvalidBounds {
        /// Lower bound in seconds
        min: f64,
        /// Upper bound in seconds
        max: f64,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new sample rate error
    pub fn invalid_sample_rate(rate: f64) -> Self {
        Self::InvalidSampleRate { rate }
    }

    /// Creates a new plausibility window error
    pub fn invalid_bounds(min: f64, max: f64) -> Self {
        Self::InvalidBounds { min, max }
    }

    /// Returns the path associated with this error, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileRead { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns true if a multi-file run should log this error and move on
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::FileRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::file_read(
            "/sessions/empty.ptx",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("failed to read file"));
        assert!(err.to_string().contains("/sessions/empty.ptx"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_is_recoverable() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(Error::file_read("a.ptx", io_err).is_recoverable());
        assert!(!Error::invalid_sample_rate(0.0).is_recoverable());
        assert!(!Error::invalid_bounds(300.0, 10.0).is_recoverable());
    }

    #[test]
    fn test_path_accessor() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = Error::file_read("markers.ptx", io_err);
        assert_eq!(err.path(), Some(std::path::Path::new("markers.ptx")));
        assert_eq!(Error::invalid_sample_rate(-1.0).path(), None);
    }
}
