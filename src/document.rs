//! Opened documents and their pages.
//!
//! A [`Document`] reads page geometry and metadata eagerly when opened. The
//! content of each [`Page`] is interpreted on first access and cached for
//! the life of the document; derived pages made with [`Page::crop`],
//! [`Page::within_bbox`] or [`Page::filter`] carry their objects with them.

use std::cell::OnceCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::{self, TableSettings, TextOptions, WordOptions};
use crate::geometry::BBox;
use crate::model::{
    Annotation, Char, Curve, Image, Line, Metadata, ObjectRef, PageObjects, Rect, Table, Word,
};
use crate::parser::{ErrorMode, LopdfBackend, OpenOptions, PageGeometry, PdfBackend};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// An opened PDF document.
pub struct Document {
    version: String,
    metadata: Metadata,
    pages: Vec<Page>,
}

impl Document {
    /// Open a PDF file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, OpenOptions::default())
    }

    /// Open a PDF file.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let backend = LopdfBackend::load_file(path, options.clone())?;
        Self::from_backend(Rc::new(backend), options)
    }

    /// Open a PDF held in memory with default options.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, OpenOptions::default())
    }

    /// Open a PDF held in memory.
    pub fn from_bytes_with_options(data: &[u8], options: OpenOptions) -> Result<Self> {
        let backend = LopdfBackend::load_bytes(data, options.clone())?;
        Self::from_backend(Rc::new(backend), options)
    }

    /// Build a document over any backend.
    pub fn from_backend(backend: Rc<dyn PdfBackend>, options: OpenOptions) -> Result<Self> {
        let metadata = backend.metadata()?;
        let version = backend.version();

        let pages = (0..backend.page_count())
            .map(|index| -> Result<Page> {
                let geometry = backend.page_geometry(index)?;
                Ok(Page {
                    number: index + 1,
                    bbox: geometry.bbox(),
                    geometry,
                    source: PageSource::Backend {
                        backend: Rc::clone(&backend),
                        index,
                    },
                    error_mode: options.error_mode,
                    objects: OnceCell::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("opened PDF {} with {} pages", version, pages.len());

        Ok(Self {
            version,
            metadata,
            pages,
        })
    }

    /// All pages, in document order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The page at `index` (0-based).
    pub fn page(&self, index: usize) -> Result<&Page> {
        self.pages
            .get(index)
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Entries of the document information dictionary.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// PDF version from the file header.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Release the parsed file. Dropping the document does the same.
    pub fn close(self) {
        log::debug!("closing document with {} pages", self.pages.len());
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version)
            .field("pages", &self.pages.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

enum PageSource {
    Backend {
        backend: Rc<dyn PdfBackend>,
        index: usize,
    },
    /// Objects were supplied when the page was derived.
    Derived,
}

/// One page of a document, or a view derived from one.
pub struct Page {
    number: usize,
    geometry: PageGeometry,
    bbox: BBox,
    source: PageSource,
    error_mode: ErrorMode,
    objects: OnceCell<PageObjects>,
}

impl Page {
    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn width(&self) -> f64 {
        self.bbox.width()
    }

    pub fn height(&self) -> f64 {
        self.bbox.height()
    }

    /// Visible area in page coordinates.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn mediabox(&self) -> BBox {
        self.geometry.to_page_bbox(self.geometry.mediabox)
    }

    /// Clockwise rotation in degrees.
    pub fn rotation(&self) -> i32 {
        self.geometry.rotation
    }

    /// All primitives on the page, interpreting the content on first use.
    pub fn objects(&self) -> Result<&PageObjects> {
        if let Some(objects) = self.objects.get() {
            return Ok(objects);
        }

        let objects = match &self.source {
            PageSource::Backend { backend, index } => match backend.page_objects(*index) {
                Ok(objects) => objects,
                Err(e) if self.error_mode == ErrorMode::Lenient => {
                    log::warn!("page {}: {}; treating it as empty", self.number, e);
                    PageObjects::default()
                }
                Err(e) => return Err(e),
            },
            PageSource::Derived => PageObjects::default(),
        };
        Ok(self.objects.get_or_init(|| objects))
    }

    pub fn chars(&self) -> Result<&[Char]> {
        Ok(&self.objects()?.chars)
    }

    pub fn lines(&self) -> Result<&[Line]> {
        Ok(&self.objects()?.lines)
    }

    pub fn rects(&self) -> Result<&[Rect]> {
        Ok(&self.objects()?.rects)
    }

    pub fn curves(&self) -> Result<&[Curve]> {
        Ok(&self.objects()?.curves)
    }

    pub fn images(&self) -> Result<&[Image]> {
        Ok(&self.objects()?.images)
    }

    pub fn annots(&self) -> Result<&[Annotation]> {
        Ok(&self.objects()?.annots)
    }

    /// Page text, or `None` when the page has none.
    pub fn extract_text(&self, options: &TextOptions) -> Result<Option<String>> {
        Ok(extract::extract_text(self.chars()?, &self.bbox, options))
    }

    pub fn extract_words(&self, options: &WordOptions) -> Result<Vec<Word>> {
        Ok(extract::extract_words(self.chars()?, options))
    }

    pub fn find_tables(&self, settings: &TableSettings) -> Result<Vec<Table>> {
        Ok(extract::find_tables(self.objects()?, settings))
    }

    /// The text of every table on the page.
    pub fn extract_tables(&self, settings: &TableSettings) -> Result<Vec<Vec<Vec<Option<String>>>>> {
        let chars = self.chars()?;
        Ok(self
            .find_tables(settings)?
            .iter()
            .map(|table| table.extract(chars))
            .collect())
    }

    /// A page restricted to `area`; objects overlapping it are clipped to it.
    pub fn crop(&self, area: BBox) -> Result<Page> {
        let area = self.clamp(area)?;
        let objects = self.objects()?.crop(&area);
        Ok(self.derive(area, objects))
    }

    /// A page holding only the objects lying entirely inside `area`.
    pub fn within_bbox(&self, area: BBox) -> Result<Page> {
        let area = self.clamp(area)?;
        let objects = self.objects()?.within(&area);
        Ok(self.derive(area, objects))
    }

    /// A page holding only the objects for which `keep` returns true.
    pub fn filter<F>(&self, keep: F) -> Result<Page>
    where
        F: FnMut(ObjectRef<'_>) -> bool,
    {
        let objects = self.objects()?.retain(keep);
        Ok(self.derive(self.bbox, objects))
    }

    /// Serialise the page geometry and primitives.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let view = PageJson {
            page_number: self.number,
            width: self.width(),
            height: self.height(),
            bbox: self.bbox,
            rotation: self.rotation(),
            objects: self.objects()?,
        };
        let json = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(&view)?,
            JsonFormat::Compact => serde_json::to_string(&view)?,
        };
        Ok(json)
    }

    fn clamp(&self, area: BBox) -> Result<BBox> {
        self.bbox
            .intersection(&area)
            .ok_or(Error::OutsidePage {
                page: self.number,
                x0: area.x0,
                top: area.top,
                x1: area.x1,
                bottom: area.bottom,
            })
    }

    fn derive(&self, bbox: BBox, objects: PageObjects) -> Page {
        Page {
            number: self.number,
            geometry: self.geometry,
            bbox,
            source: PageSource::Derived,
            error_mode: self.error_mode,
            objects: OnceCell::from(objects),
        }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("number", &self.number)
            .field("bbox", &self.bbox)
            .field("rotation", &self.geometry.rotation)
            .field("loaded", &self.objects.get().is_some())
            .finish()
    }
}

#[derive(Serialize)]
struct PageJson<'a> {
    page_number: usize,
    width: f64,
    height: f64,
    bbox: BBox,
    rotation: i32,
    #[serde(flatten)]
    objects: &'a PageObjects,
}
