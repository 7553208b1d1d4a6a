//! # pdfprobe
//!
//! PDF page inspection and extraction for Rust.
//!
//! Opens PDF documents and exposes each page the way pdfplumber does: flat
//! collections of positioned characters, lines, rectangles, curves, images
//! and annotations, plus derived words, text and tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfprobe::{open, TextOptions};
//!
//! fn main() -> pdfprobe::Result<()> {
//!     let doc = open("document.pdf")?;
//!     println!("{} pages", doc.page_count());
//!
//!     let page = doc.page(0)?;
//!     if let Some(text) = page.extract_text(&TextOptions::default())? {
//!         println!("{}", text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Positioned primitives**: characters with font, size and color; painted
//!   lines, rectangles and curves; placed images; annotations
//! - **Text**: word grouping with tolerances, plain or layout-preserving text
//! - **Tables**: ruling-line (lattice) and text-alignment (stream) detection
//! - **Lazy pages**: page content is interpreted on first access and cached

pub mod detect;
pub mod document;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod parser;
pub mod report;

// Re-export commonly used types
pub use detect::{is_pdf, PdfHeader};
pub use document::{Document, JsonFormat, Page};
pub use error::{Error, Result};
pub use extract::{
    StreamTableConfig, TableSettings, TableStrategy, TextOptions, UnicodeNorm, WordOptions,
};
pub use geometry::{BBox, Matrix, Point};
pub use model::{
    Annotation, Char, Curve, Image, Line, Metadata, MetadataValue, ObjectRef, PageObjects, Rect,
    Table, Word,
};
pub use parser::{ErrorMode, OpenOptions, PdfBackend};
pub use report::{inspect, run_benchmark, BenchmarkReport};

use std::path::Path;

/// Open a PDF file.
///
/// # Example
///
/// ```no_run
/// let doc = pdfprobe::open("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
    Document::open(path)
}

/// Open a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfprobe::{open_with_options, OpenOptions};
///
/// let options = OpenOptions::new().lenient();
/// let doc = open_with_options("document.pdf", options).unwrap();
/// ```
pub fn open_with_options<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Document> {
    Document::open_with_options(path, options)
}

/// Open a PDF from bytes.
pub fn open_bytes(data: &[u8]) -> Result<Document> {
    Document::from_bytes(data)
}

/// Extract the text of every page, one string per page.
///
/// Pages without text yield an empty string.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let doc = open(path)?;
    let options = TextOptions::default();
    doc.pages()
        .iter()
        .map(|page| Ok(page.extract_text(&options)?.unwrap_or_default()))
        .collect()
}
