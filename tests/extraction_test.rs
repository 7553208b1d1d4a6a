//! Integration tests for word and text extraction.

mod common;

use common::PdfBuilder;
use pdfprobe::{open_bytes, ObjectRef, TextOptions, WordOptions};

const TWO_LINES: &str = "BT /F1 12 Tf 100 700 Td (First line) Tj 0 -20 Td (Second line) Tj ET";

#[test]
fn test_extract_words() {
    let bytes = PdfBuilder::new().page(TWO_LINES).build();
    let doc = open_bytes(&bytes).unwrap();
    let words = doc.page(0).unwrap().extract_words(&WordOptions::default()).unwrap();

    let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["First", "line", "Second", "line"]);

    assert!((words[0].x0 - 100.0).abs() < 1e-6);
    assert!((words[0].x1 - 136.0).abs() < 1e-6);
    assert!((words[1].x0 - 143.2).abs() < 1e-6);
    assert!(words[2].top > words[0].bottom);
}

#[test]
fn test_keep_blank_chars_joins_words() {
    let bytes = PdfBuilder::new()
        .page("BT /F1 12 Tf 100 700 Td (First line) Tj ET")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let options = WordOptions::default().keep_blank_chars(true);
    let words = doc.page(0).unwrap().extract_words(&options).unwrap();

    assert_eq!(words.len(), 1);
    assert_eq!(words[0].text, "First line");
}

#[test]
fn test_extract_text_default() {
    let bytes = PdfBuilder::new().page(TWO_LINES).build();
    let doc = open_bytes(&bytes).unwrap();
    let text = doc.page(0).unwrap().extract_text(&TextOptions::default()).unwrap();

    assert_eq!(text.as_deref(), Some("First line\nSecond line"));
}

#[test]
fn test_extract_text_empty_page_is_none() {
    let bytes = PdfBuilder::new().page("0 0 m 100 100 l S").build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    assert_eq!(page.extract_text(&TextOptions::default()).unwrap(), None);
    assert_eq!(page.extract_text(&TextOptions::default().layout(true)).unwrap(), None);
}

#[test]
fn test_extract_text_layout() {
    let bytes = PdfBuilder::new().page(TWO_LINES).build();
    let doc = open_bytes(&bytes).unwrap();
    let text = doc
        .page(0)
        .unwrap()
        .extract_text(&TextOptions::default().layout(true))
        .unwrap()
        .unwrap();

    let lines: Vec<&str> = text.split('\n').collect();
    // 792 / 13 rounded up.
    assert_eq!(lines.len(), 61);
    // 612 / 7.25 rounded up.
    assert!(lines.iter().all(|l| l.chars().count() == 85));

    let indent = " ".repeat(14);
    assert_eq!(lines[6].trim_end(), format!("{}First line", indent));
    assert_eq!(lines[7].trim_end(), "");
    assert_eq!(lines[8].trim_end(), format!("{}Second line", indent));
}

#[test]
fn test_tight_tolerance_splits_kerned_text() {
    // A 2pt gap between "ab" and "cd": one word at the default tolerance,
    // two words at a 1pt tolerance.
    let content = "BT /F1 10 Tf 100 700 Td [(ab) -200 (cd)] TJ ET";
    let bytes = PdfBuilder::new().page(content).build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    let default = page.extract_text(&TextOptions::default()).unwrap();
    assert_eq!(default.as_deref(), Some("abcd"));

    let tight = page
        .extract_text(&TextOptions::default().with_x_tolerance(1.0))
        .unwrap();
    assert_eq!(tight.as_deref(), Some("ab cd"));
}

#[test]
fn test_filter_by_font() {
    let content = "\
        BT /F1 12 Tf 100 700 Td (mono) Tj ET\n\
        BT /F2 12 Tf 100 650 Td (sans) Tj ET\n";
    let bytes = PdfBuilder::new().page(content).build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    let sans = page
        .filter(|obj| match obj {
            ObjectRef::Char(c) => c.fontname == "Helvetica",
            _ => true,
        })
        .unwrap();
    let text = sans.extract_text(&TextOptions::default()).unwrap();
    assert_eq!(text.as_deref(), Some("sans"));
}

#[test]
fn test_within_bbox_drops_partial_objects() {
    let bytes = PdfBuilder::new()
        .page("BT /F1 12 Tf 100 700 Td (Hello) Tj ET")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    // Cuts through the third glyph (114.4..121.6).
    let area = pdfprobe::BBox::new(0.0, 0.0, 118.0, 792.0);
    let within = page.within_bbox(area).unwrap();
    let text = within.extract_text(&TextOptions::default()).unwrap();
    assert_eq!(text.as_deref(), Some("He"));

    let cropped = page.crop(area).unwrap();
    assert_eq!(cropped.chars().unwrap().len(), 3);
}
