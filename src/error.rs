//! Error types for the pressflow library.

use std::io;
use thiserror::Error;

/// Result type alias for pressflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during pagination.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The source markup cannot be decomposed into content units.
    ///
    /// Pagination is all-or-nothing: no partial result is produced.
    #[error("Malformed document at byte {position}: {message}")]
    MalformedDocument {
        /// Byte offset in the markup where the problem was detected
        position: usize,
        /// Description of the problem
        message: String,
    },

    /// Page or column configuration is non-positive or physically impossible.
    #[error("Invalid layout configuration: {0}")]
    InvalidLayoutConfig(String),

    /// The measurement provider could not measure a content unit.
    #[error("Measurement error: {0}")]
    Measurement(String),

    /// Error during rendering (HTML assembly, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed-document error at the given byte offset.
    pub fn malformed(position: usize, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            position,
            message: message.into(),
        }
    }

    /// Check if this error means the source markup was rejected.
    pub fn is_malformed_document(&self) -> bool {
        matches!(self, Error::MalformedDocument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed(42, "unclosed <p>");
        assert_eq!(err.to_string(), "Malformed document at byte 42: unclosed <p>");
        assert!(err.is_malformed_document());

        let err = Error::InvalidLayoutConfig("column count must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "Invalid layout configuration: column count must be at least 1"
        );
        assert!(!err.is_malformed_document());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
