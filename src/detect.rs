//! PDF header sniffing.
//!
//! Checked before handing a file to the parser so that obviously wrong
//! inputs fail with [`Error::UnknownFormat`] instead of a parser error.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// The `%PDF-x.y` header of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Version declared in the header (e.g., "1.7", "2.0").
    pub version: String,
    /// Byte offset of the `%PDF-` marker. Usually 0, but some producers
    /// prepend garbage.
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Readers accept the marker anywhere in the first kilobyte.
const SEARCH_WINDOW: usize = 1024;

/// Read and validate the header of a file on disk.
///
/// # Example
/// ```no_run
/// use pdfprobe::detect::read_header;
///
/// let header = read_header("document.pdf").unwrap();
/// println!("PDF version: {}", header.version);
/// ```
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(SEARCH_WINDOW);
    file.take(SEARCH_WINDOW as u64).read_to_end(&mut buf)?;
    sniff_header(&buf)
}

/// Validate the header in a byte buffer.
pub fn sniff_header(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(SEARCH_WINDOW)];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3
        && matches!(bytes[0], b'1' | b'2')
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
}

/// Check if a file starts like a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    read_header(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_valid_pdf() {
        let header = sniff_header(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.offset, 0);
    }

    #[test]
    fn test_sniff_leading_garbage() {
        let header = sniff_header(b"\r\n\x00junk%PDF-1.4\n").unwrap();
        assert_eq!(header.version, "1.4");
        assert_eq!(header.offset, 7);
    }

    #[test]
    fn test_sniff_invalid_format() {
        let result = sniff_header(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_truncated() {
        assert!(matches!(sniff_header(b"%PDF-1"), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_header(b""), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("9.1"));
        assert!(!is_valid_version("abc"));
        assert!(matches!(
            sniff_header(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_is_pdf_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.pdf");
        let bad = dir.path().join("b.txt");
        std::fs::write(&good, b"%PDF-1.5\n").unwrap();
        std::fs::write(&bad, b"hello").unwrap();
        assert!(is_pdf(&good));
        assert!(!is_pdf(&bad));
        assert!(!is_pdf(dir.path().join("missing.pdf")));
    }
}
