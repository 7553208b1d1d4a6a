//! PDF parsing module.
//!
//! The [`PdfBackend`] trait is the seam between the document model and the
//! PDF reader; [`LopdfBackend`] implements it on top of `lopdf`.

mod backend;
mod fonts;
mod interpreter;
mod options;
mod state;

pub use backend::{decode_text_simple, LopdfBackend, PageGeometry, PdfBackend};
pub use fonts::FontMetrics;
pub use options::{ErrorMode, OpenOptions};
