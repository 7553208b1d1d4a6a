//! Integration tests for opening documents and reading page objects.

mod common;

use common::PdfBuilder;
use pdfprobe::{open, open_bytes, BBox, Document, Error, JsonFormat, MetadataValue, OpenOptions};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_open_file_and_metadata() {
    let file = PdfBuilder::new()
        .title("Quarterly report")
        .page("BT /F1 12 Tf 100 700 Td (Hello) Tj ET")
        .page("")
        .write_temp();

    let doc = open(file.path()).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.version(), "1.5");
    assert_eq!(doc.metadata().title(), Some("Quarterly report"));
    assert_eq!(
        doc.metadata().get("Title"),
        Some(&MetadataValue::Text("Quarterly report".to_string()))
    );

    let numbers: Vec<usize> = doc.pages().iter().map(|p| p.number()).collect();
    assert_eq!(numbers, vec![1, 2]);
    doc.close();
}

#[test]
fn test_page_geometry() {
    let bytes = PdfBuilder::new().page("").build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    assert!(approx(page.width(), 612.0));
    assert!(approx(page.height(), 792.0));
    assert_eq!(page.bbox(), BBox::new(0.0, 0.0, 612.0, 792.0));
    assert_eq!(page.rotation(), 0);
}

#[test]
fn test_page_out_of_range() {
    let bytes = PdfBuilder::new().page("").build();
    let doc = open_bytes(&bytes).unwrap();
    assert!(matches!(doc.page(3), Err(Error::PageOutOfRange(3, 1))));
}

#[test]
fn test_no_metadata() {
    let bytes = PdfBuilder::new().page("").build();
    let doc = open_bytes(&bytes).unwrap();
    assert!(doc.metadata().is_empty());
}

#[test]
fn test_courier_char_geometry() {
    let bytes = PdfBuilder::new()
        .page("BT /F1 12 Tf 100 700 Td (Hello) Tj ET")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let chars = doc.page(0).unwrap().chars().unwrap();

    let text: String = chars.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(text, "Hello");

    let h = &chars[0];
    assert_eq!(h.fontname, "Courier");
    assert!(approx(h.size, 12.0));
    assert!(h.upright);
    assert!(approx(h.x0, 100.0));
    assert!(approx(h.x1, 107.2));
    assert!(approx(h.top, 81.884));
    assert!(approx(h.bottom, 93.884));

    let e = &chars[1];
    assert!(approx(e.x0, 107.2));
}

#[test]
fn test_paths_and_image() {
    let content = "\
        1 w 72 500 m 272 500 l S\n\
        72 400 100 50 re f\n\
        q 100 0 0 50 10 20 cm /Im1 Do Q\n";
    let bytes = PdfBuilder::new().page(content).build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    let lines = page.lines().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_horizontal());
    assert!(approx(lines[0].top, 292.0));
    assert!(approx(lines[0].x1, 272.0));

    let rects = page.rects().unwrap();
    assert_eq!(rects.len(), 1);
    assert!(rects[0].fill);
    assert!(!rects[0].stroke);
    assert!(approx(rects[0].top, 342.0));
    assert!(approx(rects[0].bottom, 392.0));

    let images = page.images().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].name, "Im1");
    assert_eq!(images[0].srcsize, Some((2, 2)));
    assert_eq!(images[0].bits, Some(8));
    assert!(approx(images[0].x0, 10.0));
    assert!(approx(images[0].x1, 110.0));
    assert!(approx(images[0].top, 722.0));
    assert!(approx(images[0].bottom, 772.0));
}

#[test]
fn test_form_xobject_is_placed_by_its_matrix() {
    let bytes = PdfBuilder::new()
        .form("0 0 m 100 0 l S")
        .page("/Fm1 Do")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let lines = doc.page(0).unwrap().lines().unwrap();

    assert_eq!(lines.len(), 1);
    assert!(approx(lines[0].x0, 50.0));
    assert!(approx(lines[0].x1, 150.0));
    assert!(approx(lines[0].top, 742.0));
}

#[test]
fn test_form_state_does_not_leak_to_page() {
    // The form opens a scaling save and never restores it.
    let bytes = PdfBuilder::new()
        .form("q 2 0 0 2 0 0 cm")
        .page("/Fm1 Do 100 100 m 200 100 l S")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let lines = doc.page(0).unwrap().lines().unwrap();

    assert_eq!(lines.len(), 1);
    assert!(approx(lines[0].x0, 100.0));
    assert!(approx(lines[0].x1, 200.0));
    assert!(approx(lines[0].top, 692.0));
}

#[test]
fn test_form_cannot_restore_page_saves() {
    // A stray Q inside the form must not pop the page's own save.
    let bytes = PdfBuilder::new()
        .form("Q")
        .page("q 1 0 0 1 100 0 cm /Fm1 Do 0 100 m 10 100 l S Q")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let lines = doc.page(0).unwrap().lines().unwrap();

    assert_eq!(lines.len(), 1);
    assert!(approx(lines[0].x0, 100.0));
    assert!(approx(lines[0].x1, 110.0));
}

#[test]
fn test_link_annotation() {
    let bytes = PdfBuilder::new()
        .link([10, 10, 60, 30], "https://example.com")
        .page("")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let annots = doc.page(0).unwrap().annots().unwrap();

    assert_eq!(annots.len(), 1);
    assert_eq!(annots[0].subtype, "Link");
    assert_eq!(annots[0].uri.as_deref(), Some("https://example.com"));
    assert!(approx(annots[0].top, 762.0));
    assert!(approx(annots[0].bottom, 782.0));
}

#[test]
fn test_crop_keeps_objects_inside() {
    let content = "\
        BT /F1 12 Tf 100 700 Td (Left) Tj ET\n\
        BT /F1 12 Tf 400 700 Td (Right) Tj ET\n";
    let bytes = PdfBuilder::new().page(content).build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    let cropped = page.crop(BBox::new(0.0, 0.0, 306.0, 792.0)).unwrap();
    assert!(approx(cropped.width(), 306.0));
    let text: String = cropped.chars().unwrap().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(text, "Left");

    // The source page is untouched.
    assert_eq!(page.chars().unwrap().len(), 9);
}

#[test]
fn test_page_json() {
    let bytes = PdfBuilder::new()
        .page("BT /F1 12 Tf 100 700 Td (A) Tj ET")
        .build();
    let doc = open_bytes(&bytes).unwrap();
    let json = doc.page(0).unwrap().to_json(JsonFormat::Compact).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["page_number"], 1);
    assert_eq!(value["chars"][0]["text"], "A");
    assert_eq!(value["chars"][0]["fontname"], "Courier");
}

#[test]
fn test_crop_outside_page_fails() {
    let bytes = PdfBuilder::new().page("").build();
    let doc = open_bytes(&bytes).unwrap();
    let page = doc.page(0).unwrap();

    let result = page.crop(BBox::new(700.0, 0.0, 800.0, 100.0));
    assert!(matches!(result, Err(Error::OutsidePage { page: 1, .. })));
}

#[test]
fn test_encrypted_without_password_fails() {
    let bytes = PdfBuilder::new().encrypted().page("").build();
    assert!(matches!(open_bytes(&bytes), Err(Error::Encrypted)));
}

#[test]
fn test_encrypted_with_wrong_password_fails() {
    let bytes = PdfBuilder::new().encrypted().page("").build();
    let result = Document::from_bytes_with_options(&bytes, OpenOptions::new().with_password("wrong"));
    assert!(matches!(result, Err(Error::Encrypted)));
}

#[test]
fn test_password_ignored_for_plain_document() {
    let bytes = PdfBuilder::new().page("").build();
    let doc = Document::from_bytes_with_options(&bytes, OpenOptions::new().with_password("secret")).unwrap();
    assert_eq!(doc.page_count(), 1);
}
