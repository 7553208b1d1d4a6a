//! Data model for extracted page content.

mod metadata;
mod objects;
mod table;
mod word;

pub use metadata::{parse_pdf_date, Metadata, MetadataValue};
pub use objects::{
    Annotation, Bounded, Char, Color, Curve, Image, Line, ObjectRef, PageObjects, Rect,
};
pub use table::{Table, TableRow};
pub use word::Word;

#[cfg(test)]
pub(crate) use objects::fixtures;
