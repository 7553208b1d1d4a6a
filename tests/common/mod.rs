//! Synthetic PDF fixtures built with lopdf.

#![allow(dead_code)]

use std::io::Write;

use lopdf::{dictionary, Document, Object, Stream};
use tempfile::NamedTempFile;

/// Builds small single-purpose PDFs.
///
/// Every page shares one resource dictionary: `/F1` is Courier, `/F2` is
/// Helvetica, `/Fm1` is a form drawing whatever `form` was given and `/Im1`
/// is a 2x2 grayscale image.
pub struct PdfBuilder {
    pages: Vec<String>,
    title: Option<String>,
    form: Option<String>,
    link: Option<([i64; 4], String)>,
    encrypted: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            title: None,
            form: None,
            link: None,
            encrypted: false,
        }
    }

    pub fn page(mut self, content: &str) -> Self {
        self.pages.push(content.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Form XObject content, placed with `/Matrix [1 0 0 1 50 50]`.
    pub fn form(mut self, content: &str) -> Self {
        self.form = Some(content.to_string());
        self
    }

    /// A `/Link` annotation with a URI action on the first page.
    pub fn link(mut self, rect: [i64; 4], uri: &str) -> Self {
        self.link = Some((rect, uri.to_string()));
        self
    }

    /// A standard-security `/Encrypt` dictionary whose owner and user
    /// entries match no password.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let courier = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let helvetica = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let image = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(2),
                "Height" => Object::Integer(2),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => Object::Integer(8),
            },
            vec![0, 255, 255, 0],
        ));

        let mut xobjects = dictionary! { "Im1" => image };
        if let Some(form) = &self.form {
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => ints(&[0, 0, 200, 200]),
                    "Matrix" => ints(&[1, 0, 0, 1, 50, 50]),
                },
                form.as_bytes().to_vec(),
            ));
            xobjects.set("Fm1", form_id);
        }

        let resources = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => courier, "F2" => helvetica },
            "XObject" => xobjects,
        });

        let mut kids = Vec::new();
        for (i, content) in self.pages.iter().enumerate() {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources,
            };
            if let (0, Some((rect, uri))) = (i, &self.link) {
                page.set(
                    "Annots",
                    vec![Object::Dictionary(dictionary! {
                        "Type" => "Annot",
                        "Subtype" => "Link",
                        "Rect" => ints(rect),
                        "A" => dictionary! {
                            "S" => "URI",
                            "URI" => Object::string_literal(uri.as_str()),
                        },
                    })],
                );
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
                "MediaBox" => ints(&[0, 0, 612, 792]),
            }),
        );

        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);

        if let Some(title) = &self.title {
            let info = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
            });
            doc.trailer.set("Info", info);
        }

        if self.encrypted {
            let encrypt = doc.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => Object::Integer(1),
                "R" => Object::Integer(2),
                "Length" => Object::Integer(40),
                "O" => Object::String(vec![0x11; 32], lopdf::StringFormat::Hexadecimal),
                "U" => Object::String(vec![0x22; 32], lopdf::StringFormat::Hexadecimal),
                "P" => Object::Integer(-4),
            });
            doc.trailer.set("Encrypt", encrypt);
            let id = Object::String(vec![0x33; 16], lopdf::StringFormat::Hexadecimal);
            doc.trailer.set("ID", vec![id.clone(), id]);
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("save fixture");
        buf
    }

    /// Write the PDF to a temporary `.pdf` file.
    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .expect("create temp file");
        file.write_all(&self.build()).expect("write fixture");
        file.flush().expect("flush fixture");
        file
    }
}

fn ints(values: &[i64]) -> Object {
    Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
}

/// Content stream drawing a ruled `cols` x `rows` grid of 100x20 cells whose
/// top-left corner is at PDF (50, 700), with `labels` written into the cells
/// row by row in 10pt Courier.
pub fn ruled_grid(cols: usize, rows: usize, labels: &[&str]) -> String {
    let left = 50;
    let top = 700;
    let right = left + 100 * cols;
    let bottom = top - 20 * rows;

    let mut content = String::from("0.5 w\n");
    for r in 0..=rows {
        let y = top - 20 * r;
        content.push_str(&format!("{} {} m {} {} l S\n", left, y, right, y));
    }
    for c in 0..=cols {
        let x = left + 100 * c;
        content.push_str(&format!("{} {} m {} {} l S\n", x, top, x, bottom));
    }

    for (i, label) in labels.iter().enumerate() {
        let (r, c) = (i / cols, i % cols);
        let x = left + 100 * c + 5;
        let y = top - 20 * r - 15;
        content.push_str(&format!(
            "BT /F1 10 Tf 1 0 0 1 {} {} Tm ({}) Tj ET\n",
            x, y, label
        ));
    }
    content
}
