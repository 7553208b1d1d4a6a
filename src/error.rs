//! Error types for the pdfprobe library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while opening or extracting a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and could not be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// A page content stream could not be interpreted.
    #[error("Content stream error on page {page}: {message}")]
    ContentStream { page: usize, message: String },

    /// Page index is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// A crop or `within_bbox` area does not overlap the page.
    #[error("Bounding box ({x0}, {top}, {x1}, {bottom}) lies outside page {page}")]
    OutsidePage {
        page: usize,
        x0: f64,
        top: f64,
        x1: f64,
        bottom: f64,
    },

    /// Serialization to JSON failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::ContentStream {
            page: 2,
            message: "unbalanced Q".to_string(),
        };
        assert_eq!(err.to_string(), "Content stream error on page 2: unbalanced Q");
    }

    #[test]
    fn test_lopdf_error_conversion() {
        let err: Error = lopdf::Error::IO(io::Error::new(io::ErrorKind::Other, "disk")).into();
        assert!(matches!(err, Error::Io(_)));

        let err: Error = lopdf::Error::PageNumberNotFound(3).into();
        assert!(matches!(err, Error::PdfParse(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
