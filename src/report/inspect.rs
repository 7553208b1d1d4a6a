//! First-page diagnostic report.

use std::io::Write;
use std::path::Path;

use super::repr::{fmt_num, metadata_repr, py_float, py_repr_str, truncate_chars};
use crate::document::{Document, Page};
use crate::error::Result;
use crate::extract::{TextOptions, WordOptions};

const CHAR_PREVIEW: usize = 5;
const WORD_PREVIEW: usize = 3;
const TEXT_PREVIEW: usize = 100;

/// Open `path` and write the inspection report to `out`.
pub fn inspect<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<()> {
    let doc = Document::open(path)?;
    write_report(&doc, out)
}

/// Write document info and the details of its first page.
pub fn write_report<W: Write>(doc: &Document, out: &mut W) -> Result<()> {
    writeln!(out, "PDF Info:")?;
    writeln!(out, "  Pages: {}", doc.page_count())?;
    writeln!(out, "  Metadata: {}", metadata_repr(doc.metadata()))?;
    writeln!(out)?;

    // Only the first page is inspected.
    if let Some(page) = doc.pages().first() {
        write_page(page, out)?;
    }
    Ok(())
}

fn write_page<W: Write>(page: &Page, out: &mut W) -> Result<()> {
    let bbox = page.bbox();
    writeln!(out, "Page {}:", page.number())?;
    writeln!(out, "  Width: {}", fmt_num(page.width()))?;
    writeln!(out, "  Height: {}", fmt_num(page.height()))?;
    writeln!(
        out,
        "  Bbox: ({}, {}, {}, {})",
        fmt_num(bbox.x0),
        fmt_num(bbox.top),
        fmt_num(bbox.x1),
        fmt_num(bbox.bottom)
    )?;
    writeln!(out)?;

    let chars = page.chars()?;
    writeln!(out, "  Total characters: {}", chars.len())?;
    if !chars.is_empty() {
        writeln!(out, "  First {} characters:", CHAR_PREVIEW)?;
        for (i, c) in chars.iter().take(CHAR_PREVIEW).enumerate() {
            writeln!(out, "    {}. Text: '{}'", i + 1, c.text)?;
            writeln!(
                out,
                "       Position: x0={:.2}, y0={:.2}, x1={:.2}, y1={:.2}",
                c.x0, c.top, c.x1, c.bottom
            )?;
            writeln!(out, "       Font: {}, Size: {}", c.fontname, py_float(c.size))?;
            writeln!(out)?;
        }
    }

    writeln!(out, "  Text extraction methods:")?;
    let variants = [
        ("Default", TextOptions::default()),
        ("x_tolerance=1", TextOptions::default().with_x_tolerance(1.0)),
        ("y_tolerance=1", TextOptions::default().with_y_tolerance(1.0)),
        ("layout=True", TextOptions::default().layout(true)),
    ];
    for (i, (label, options)) in variants.iter().enumerate() {
        let text = page.extract_text(options)?;
        writeln!(out, "    {}. {}: {}", i + 1, label, preview(text.as_deref()))?;
    }

    let words = page.extract_words(&WordOptions::default())?;
    writeln!(out)?;
    writeln!(out, "  Words extracted: {}", words.len())?;
    if !words.is_empty() {
        writeln!(out, "  First {} words:", WORD_PREVIEW)?;
        for (i, w) in words.iter().take(WORD_PREVIEW).enumerate() {
            writeln!(out, "    {}. '{}' at ({:.2}, {:.2})", i + 1, w.text, w.x0, w.top)?;
        }
    }

    writeln!(out, "{}", "-".repeat(50))?;
    Ok(())
}

/// Repr of the first characters of `text`, or of the `'None'` sentinel.
fn preview(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => py_repr_str(truncate_chars(t, TEXT_PREVIEW)),
        _ => py_repr_str("None"),
    }
}
