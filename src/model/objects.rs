//! Positioned page primitives produced by the content-stream interpreter.

use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point};

/// Color components in the current color space (1 = gray, 3 = RGB, 4 = CMYK).
pub type Color = Vec<f64>;

/// Access to the bounding box of any page primitive.
pub trait Bounded {
    fn bbox(&self) -> BBox;

    /// Replace the bounding box, used when cropping.
    fn set_bbox(&mut self, bbox: BBox);

    /// Clip to `area`, `None` when the object lies outside it.
    fn clipped(&self, area: &BBox) -> Option<Self>
    where
        Self: Sized + Clone,
    {
        let clipped = self.bbox().intersection(area)?;
        let mut obj = self.clone();
        obj.set_bbox(clipped);
        Some(obj)
    }
}

macro_rules! impl_bounded {
    ($($ty:ty),*) => {
        $(
            impl Bounded for $ty {
                fn bbox(&self) -> BBox {
                    BBox {
                        x0: self.x0,
                        top: self.top,
                        x1: self.x1,
                        bottom: self.bottom,
                    }
                }

                fn set_bbox(&mut self, bbox: BBox) {
                    self.x0 = bbox.x0;
                    self.top = bbox.top;
                    self.x1 = bbox.x1;
                    self.bottom = bbox.bottom;
                }
            }
        )*
    };
}

/// A single rendered glyph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Char {
    /// Decoded text, usually one character (ligatures may decode to more).
    pub text: String,
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    /// Base font name as written in the font dictionary.
    pub fontname: String,
    /// Rendered size: the glyph box height for upright text, its width otherwise.
    pub size: f64,
    /// Whether the baseline runs left to right, unrotated.
    pub upright: bool,
    /// Horizontal advance in page units.
    pub adv: f64,
    pub stroking_color: Color,
    pub non_stroking_color: Color,
    /// Text rendering matrix at the glyph origin.
    pub matrix: [f64; 6],
}

impl Char {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whitespace-only glyphs.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// A straight painted segment (a two-point subpath).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub points: Vec<Point>,
    pub linewidth: f64,
    pub stroke: bool,
    pub stroking_color: Color,
}

impl Line {
    pub fn is_horizontal(&self) -> bool {
        self.top == self.bottom
    }

    pub fn is_vertical(&self) -> bool {
        self.x0 == self.x1
    }
}

/// An axis-aligned rectangle (from `re` or a closed four-corner path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub linewidth: f64,
    pub stroke: bool,
    pub fill: bool,
    pub stroking_color: Color,
    pub non_stroking_color: Color,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Any other painted path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub points: Vec<Point>,
    pub linewidth: f64,
    pub stroke: bool,
    pub fill: bool,
    pub stroking_color: Color,
    pub non_stroking_color: Color,
}

/// A placed image XObject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    /// Resource name the image was drawn with.
    pub name: String,
    /// Source size in pixels.
    pub srcsize: Option<(i64, i64)>,
    pub colorspace: Option<String>,
    pub bits: Option<i64>,
}

/// A page annotation from `/Annots`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub subtype: String,
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub contents: Option<String>,
    /// Target of a `/Link` annotation with a URI action.
    pub uri: Option<String>,
}

impl_bounded!(Char, Line, Rect, Curve, Image, Annotation);

/// All primitives found on a page, in content-stream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageObjects {
    pub chars: Vec<Char>,
    pub lines: Vec<Line>,
    pub rects: Vec<Rect>,
    pub curves: Vec<Curve>,
    pub images: Vec<Image>,
    pub annots: Vec<Annotation>,
}

impl PageObjects {
    /// Total number of primitives.
    pub fn len(&self) -> usize {
        self.chars.len()
            + self.lines.len()
            + self.rects.len()
            + self.curves.len()
            + self.images.len()
            + self.annots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep the objects for which `keep` returns true.
    pub fn retain<F>(&self, mut keep: F) -> PageObjects
    where
        F: FnMut(ObjectRef<'_>) -> bool,
    {
        PageObjects {
            chars: self.chars.iter().filter(|o| keep(ObjectRef::Char(o))).cloned().collect(),
            lines: self.lines.iter().filter(|o| keep(ObjectRef::Line(o))).cloned().collect(),
            rects: self.rects.iter().filter(|o| keep(ObjectRef::Rect(o))).cloned().collect(),
            curves: self.curves.iter().filter(|o| keep(ObjectRef::Curve(o))).cloned().collect(),
            images: self.images.iter().filter(|o| keep(ObjectRef::Image(o))).cloned().collect(),
            annots: self.annots.iter().filter(|o| keep(ObjectRef::Annot(o))).cloned().collect(),
        }
    }

    /// Objects overlapping `area`, clipped to it.
    pub fn crop(&self, area: &BBox) -> PageObjects {
        fn clip_all<T: Bounded + Clone>(items: &[T], area: &BBox) -> Vec<T> {
            items.iter().filter_map(|o| o.clipped(area)).collect()
        }

        PageObjects {
            chars: clip_all(&self.chars, area),
            lines: clip_all(&self.lines, area),
            rects: clip_all(&self.rects, area),
            curves: clip_all(&self.curves, area),
            images: clip_all(&self.images, area),
            annots: clip_all(&self.annots, area),
        }
    }

    /// Objects lying entirely inside `area`.
    pub fn within(&self, area: &BBox) -> PageObjects {
        self.retain(|o| area.contains(&o.bbox()))
    }
}

/// Borrowed view of one primitive, passed to filter predicates.
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'a> {
    Char(&'a Char),
    Line(&'a Line),
    Rect(&'a Rect),
    Curve(&'a Curve),
    Image(&'a Image),
    Annot(&'a Annotation),
}

impl ObjectRef<'_> {
    pub fn bbox(&self) -> BBox {
        match self {
            ObjectRef::Char(o) => o.bbox(),
            ObjectRef::Line(o) => o.bbox(),
            ObjectRef::Rect(o) => o.bbox(),
            ObjectRef::Curve(o) => o.bbox(),
            ObjectRef::Image(o) => o.bbox(),
            ObjectRef::Annot(o) => o.bbox(),
        }
    }

    /// pdfplumber-style object type name.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectRef::Char(_) => "char",
            ObjectRef::Line(_) => "line",
            ObjectRef::Rect(_) => "rect",
            ObjectRef::Curve(_) => "curve",
            ObjectRef::Image(_) => "image",
            ObjectRef::Annot(_) => "annot",
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn char_at(text: &str, x0: f64, top: f64, width: f64, size: f64) -> Char {
        Char {
            text: text.to_string(),
            x0,
            top,
            x1: x0 + width,
            bottom: top + size,
            fontname: "Helvetica".to_string(),
            size,
            upright: true,
            adv: width,
            stroking_color: vec![0.0],
            non_stroking_color: vec![0.0],
            matrix: [size, 0.0, 0.0, size, x0, 0.0],
        }
    }

    /// Lay out `text` as fixed-pitch characters starting at `(x0, top)`.
    pub fn chars_for(text: &str, x0: f64, top: f64) -> Vec<Char> {
        text.chars()
            .enumerate()
            .map(|(i, c)| char_at(&c.to_string(), x0 + i as f64 * 6.0, top, 6.0, 10.0))
            .collect()
    }

    pub fn line(x0: f64, top: f64, x1: f64, bottom: f64) -> Line {
        Line {
            x0,
            top,
            x1,
            bottom,
            points: vec![Point::new(x0, top), Point::new(x1, bottom)],
            linewidth: 1.0,
            stroke: true,
            stroking_color: vec![0.0],
        }
    }

    pub fn rect(x0: f64, top: f64, x1: f64, bottom: f64) -> Rect {
        Rect {
            x0,
            top,
            x1,
            bottom,
            linewidth: 1.0,
            stroke: true,
            fill: false,
            stroking_color: vec![0.0],
            non_stroking_color: vec![0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_crop_clips_and_drops() {
        let objects = PageObjects {
            chars: chars_for("abc", 0.0, 0.0),
            lines: vec![line(0.0, 50.0, 200.0, 50.0)],
            ..Default::default()
        };

        let area = BBox::new(0.0, 0.0, 100.0, 100.0);
        let cropped = objects.crop(&area);
        assert_eq!(cropped.chars.len(), 3);
        assert_eq!(cropped.lines.len(), 1);
        assert_eq!(cropped.lines[0].x1, 100.0);

        let area = BBox::new(5.0, 0.0, 11.0, 5.0);
        let cropped = objects.crop(&area);
        assert_eq!(cropped.chars.len(), 2);
        assert_eq!(cropped.chars[0].x0, 5.0);
        assert_eq!(cropped.chars[1].x1, 11.0);
        assert!(cropped.lines.is_empty());
    }

    #[test]
    fn test_within_requires_full_containment() {
        let objects = PageObjects {
            chars: chars_for("abc", 0.0, 0.0),
            ..Default::default()
        };
        let inside = objects.within(&BBox::new(0.0, 0.0, 12.0, 10.0));
        assert_eq!(inside.chars.len(), 2);
    }

    #[test]
    fn test_retain_by_kind() {
        let objects = PageObjects {
            chars: chars_for("ab", 0.0, 0.0),
            rects: vec![rect(0.0, 0.0, 10.0, 10.0)],
            ..Default::default()
        };
        assert_eq!(objects.len(), 3);

        let only_rects = objects.retain(|o| o.kind() == "rect");
        assert_eq!(only_rects.len(), 1);
        assert!(only_rects.chars.is_empty());
    }

    #[test]
    fn test_char_blank() {
        assert!(char_at(" ", 0.0, 0.0, 3.0, 10.0).is_blank());
        assert!(!char_at("x", 0.0, 0.0, 3.0, 10.0).is_blank());
    }
}
