//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the operations the document model
//! needs, isolating the concrete PDF library (lopdf) from page handling
//! and extraction.

use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::interpreter;
use super::options::OpenOptions;
use crate::detect;
use crate::error::{Error, Result};
use crate::geometry::BBox;
use crate::model::{Annotation, Metadata, MetadataValue, PageObjects};

/// US Letter, used when a page tree carries no `/MediaBox` at all.
const DEFAULT_MEDIABOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page boxes in PDF user space (`[x0 y0 x1 y1]`, y growing upwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub mediabox: [f64; 4],
    pub cropbox: Option<[f64; 4]>,
    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub rotation: i32,
}

impl PageGeometry {
    pub fn width(&self) -> f64 {
        self.mediabox[2] - self.mediabox[0]
    }

    pub fn height(&self) -> f64 {
        self.mediabox[3] - self.mediabox[1]
    }

    /// Convert a user-space box to page space (top-left origin of the MediaBox).
    pub fn to_page_bbox(&self, b: [f64; 4]) -> BBox {
        let [mx0, _, _, my1] = self.mediabox;
        BBox::new(b[0] - mx0, my1 - b[3], b[2] - mx0, my1 - b[1])
    }

    /// The visible area in page space: the CropBox, or the whole MediaBox.
    pub fn bbox(&self) -> BBox {
        self.to_page_bbox(self.cropbox.unwrap_or(self.mediabox))
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, page geometry, interpreted
/// page content and document metadata without exposing any concrete PDF
/// library types.
pub trait PdfBackend {
    /// PDF version from the file header (e.g. "1.7").
    fn version(&self) -> String;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page boxes and rotation for the page at `index` (0-based).
    fn page_geometry(&self, index: usize) -> Result<PageGeometry>;

    /// Interpret the page at `index` into positioned primitives.
    fn page_objects(&self, index: usize) -> Result<PageObjects>;

    /// Document information dictionary.
    fn metadata(&self) -> Result<Metadata>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Follow an indirect reference, returning the object itself otherwise.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Helper: extract a number from a PDF object.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Helper: extract a name as a string.
pub(crate) fn name_of(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Helper: extract a text string (or name) as a string.
pub(crate) fn text_of(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Stream data with filters applied.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| Error::Corrupted(format!("failed to decompress stream: {}", e)))
    } else {
        Ok(stream.content.clone())
    }
}

fn box_from_array(doc: &LopdfDocument, obj: &Object) -> Option<[f64; 4]> {
    let arr = resolve(doc, obj).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(arr) {
        *slot = number(resolve(doc, item))?;
    }
    Some([
        values[0].min(values[2]),
        values[1].min(values[3]),
        values[0].max(values[2]),
        values[1].max(values[3]),
    ])
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    page_ids: Vec<ObjectId>,
    options: OpenOptions,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        detect::read_header(path)?;
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc, options)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8], options: OpenOptions) -> Result<Self> {
        detect::sniff_header(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc, options)
    }

    fn from_document(mut doc: LopdfDocument, options: OpenOptions) -> Result<Self> {
        if doc.is_encrypted() {
            let password = options.password.as_deref().unwrap_or("");
            doc.decrypt(password).map_err(|e| {
                log::debug!("decryption failed: {}", e);
                Error::Encrypted
            })?;
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        log::debug!("loaded PDF {} with {} pages", doc.version, page_ids.len());
        Ok(Self {
            doc,
            page_ids,
            options,
        })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.page_ids.len()))
    }

    /// Look up a key in the page dictionary, walking up the page tree
    /// (via /Parent) if the key is not found on the page itself.
    fn resolve_inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut current = page_id;
        // Bounded walk: a /Parent cycle must not hang.
        for _ in 0..64 {
            let dict = self.doc.get_dictionary(current)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(resolve(&self.doc, value)));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => return Ok(None),
            }
        }
        Err(Error::Corrupted("page tree /Parent chain too deep".to_string()))
    }

    fn page_resources(&self, page_id: ObjectId) -> Result<Option<&Dictionary>> {
        Ok(self
            .resolve_inherited(page_id, b"Resources")?
            .and_then(|o| o.as_dict().ok()))
    }

    /// Get page content stream bytes, concatenating content arrays.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => resolve(&self.doc, obj),
            Err(_) => return Ok(Vec::new()), // Page with no content
        };

        match contents {
            Object::Stream(s) => stream_bytes(s),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    match resolve(&self.doc, obj) {
                        Object::Stream(s) => {
                            content.extend_from_slice(&stream_bytes(s)?);
                            content.push(b'\n');
                        }
                        other => log::warn!("skipping non-stream /Contents entry: {:?}", other),
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Corrupted("Invalid content stream".to_string())),
        }
    }

    fn page_annotations(&self, page_id: ObjectId, geometry: &PageGeometry) -> Vec<Annotation> {
        let Ok(page_dict) = self.doc.get_dictionary(page_id) else {
            return Vec::new();
        };
        let Some(annots) = page_dict
            .get(b"Annots")
            .ok()
            .and_then(|o| resolve(&self.doc, o).as_array().ok())
        else {
            return Vec::new();
        };

        let mut result = Vec::new();
        for entry in annots {
            let Ok(dict) = resolve(&self.doc, entry).as_dict() else {
                continue;
            };
            let Some(subtype) = dict.get(b"Subtype").ok().and_then(|o| name_of(resolve(&self.doc, o)))
            else {
                continue;
            };
            let Some(rect) = dict.get(b"Rect").ok().and_then(|o| box_from_array(&self.doc, o)) else {
                continue;
            };
            let bbox = geometry.to_page_bbox(rect);

            let contents = dict
                .get(b"Contents")
                .ok()
                .and_then(|o| text_of(resolve(&self.doc, o)));
            let uri = dict
                .get(b"A")
                .ok()
                .and_then(|o| resolve(&self.doc, o).as_dict().ok())
                .and_then(|action| action.get(b"URI").ok())
                .and_then(|o| text_of(resolve(&self.doc, o)));

            result.push(Annotation {
                subtype,
                x0: bbox.x0,
                top: bbox.top,
                x1: bbox.x1,
                bottom: bbox.bottom,
                contents,
                uri,
            });
        }
        result
    }

    fn metadata_value(&self, obj: &Object, depth: usize) -> Option<MetadataValue> {
        match resolve(&self.doc, obj) {
            Object::String(bytes, _) => Some(MetadataValue::Text(decode_text_simple(bytes))),
            Object::Name(n) => Some(MetadataValue::Text(String::from_utf8_lossy(n).into_owned())),
            Object::Integer(i) => Some(MetadataValue::Integer(*i)),
            Object::Real(r) => Some(MetadataValue::Real(*r as f64)),
            Object::Boolean(b) => Some(MetadataValue::Boolean(*b)),
            Object::Array(items) if depth < 4 => Some(MetadataValue::Array(
                items
                    .iter()
                    .filter_map(|item| self.metadata_value(item, depth + 1))
                    .collect(),
            )),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        let page_id = self.page_id(index)?;

        let mediabox = self
            .resolve_inherited(page_id, b"MediaBox")?
            .and_then(|o| box_from_array(&self.doc, o))
            .unwrap_or(DEFAULT_MEDIABOX);
        let cropbox = self
            .resolve_inherited(page_id, b"CropBox")?
            .and_then(|o| box_from_array(&self.doc, o));
        let rotation = self
            .resolve_inherited(page_id, b"Rotate")?
            .and_then(number)
            .map(|r| (r as i64).rem_euclid(360) as i32)
            .unwrap_or(0);

        Ok(PageGeometry {
            mediabox,
            cropbox,
            rotation,
        })
    }

    fn page_objects(&self, index: usize) -> Result<PageObjects> {
        let page_id = self.page_id(index)?;
        let geometry = self.page_geometry(index)?;
        let resources = self.page_resources(page_id)?;
        let content = self.page_content(page_id)?;

        let mut objects = interpreter::interpret(
            &self.doc,
            &content,
            resources,
            &geometry,
            self.options.max_form_depth,
        )
        .map_err(|e| Error::ContentStream {
            page: index + 1,
            message: e.to_string(),
        })?;

        if self.options.annotations {
            objects.annots = self.page_annotations(page_id, &geometry);
        }

        log::debug!(
            "page {}: {} chars, {} lines, {} rects, {} curves, {} images",
            index + 1,
            objects.chars.len(),
            objects.lines.len(),
            objects.rects.len(),
            objects.curves.len(),
            objects.images.len()
        );
        Ok(objects)
    }

    fn metadata(&self) -> Result<Metadata> {
        let mut metadata = Metadata::new();

        let info = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|o| resolve(&self.doc, o).as_dict().ok());

        if let Some(info) = info {
            for (key, value) in info.iter() {
                let key = String::from_utf8_lossy(key).into_owned();
                match self.metadata_value(value, 0) {
                    Some(v) => metadata.insert(key, v),
                    None => log::debug!("skipping metadata entry {} of unsupported type", key),
                }
            }
        }

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        // UTF-16BE BOM + "Hi"
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_number() {
        assert_eq!(number(&Object::Integer(42)), Some(42.0));
        assert_eq!(number(&Object::Real(1.5)), Some(1.5));
        assert_eq!(number(&Object::Null), None);
    }

    #[test]
    fn test_geometry_page_space() {
        let geometry = PageGeometry {
            mediabox: [0.0, 0.0, 612.0, 792.0],
            cropbox: Some([36.0, 36.0, 576.0, 756.0]),
            rotation: 0,
        };
        assert_eq!(geometry.width(), 612.0);
        assert_eq!(geometry.height(), 792.0);
        assert_eq!(geometry.bbox(), BBox::new(36.0, 36.0, 576.0, 756.0));

        let offset = PageGeometry {
            mediabox: [10.0, 20.0, 110.0, 220.0],
            cropbox: None,
            rotation: 90,
        };
        assert_eq!(offset.bbox(), BBox::new(0.0, 0.0, 100.0, 200.0));
        assert_eq!(
            offset.to_page_bbox([10.0, 200.0, 60.0, 220.0]),
            BBox::new(0.0, 0.0, 50.0, 20.0)
        );
    }

    #[test]
    fn test_load_bytes_rejects_non_pdf() {
        let result = LopdfBackend::load_bytes(b"hello world", OpenOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
