//! Graphics, text and path state tracked while interpreting a content stream.

use std::fmt;
use std::rc::Rc;

use lopdf::{Dictionary, Document as LopdfDocument};

use super::fonts::FontMetrics;
use crate::geometry::{Matrix, Point};
use crate::model::Color;

/// Decodes one character code to text with the font's encoding.
type Decoder<'a> = Box<dyn Fn(&[u8]) -> Option<String> + 'a>;

/// A font resource selected with `Tf`.
pub(crate) struct LoadedFont<'a> {
    pub metrics: FontMetrics,
    /// Built once from the encoding or ToUnicode map; `None` without a dictionary.
    decoder: Option<Decoder<'a>>,
}

impl<'a> LoadedFont<'a> {
    pub fn new(doc: &'a LopdfDocument, dict: Option<&'a Dictionary>, resource_name: &str) -> Self {
        let metrics = match dict {
            Some(d) => FontMetrics::from_dict(doc, d, resource_name),
            None => FontMetrics::standard(resource_name),
        };
        let decoder = dict
            .and_then(|d| d.get_font_encoding(doc).ok())
            .map(|enc| {
                Box::new(move |raw: &[u8]| LopdfDocument::decode_text(&enc, raw).ok()) as Decoder<'a>
            });
        Self { metrics, decoder }
    }

    /// Text for one character code, `None` when the encoding has no mapping.
    pub fn decode(&self, raw: &[u8]) -> Option<String> {
        let decoder = self.decoder.as_ref()?;
        decoder(raw).filter(|s| !s.is_empty()).or_else(|| match raw {
            // ToUnicode maps are keyed by two-byte codes.
            [b] => decoder(&[0, *b]).filter(|s| !s.is_empty() && !s.contains('\0')),
            _ => None,
        })
    }
}

impl fmt::Debug for LoadedFont<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFont")
            .field("metrics", &self.metrics)
            .field("has_decoder", &self.decoder.is_some())
            .finish()
    }
}

/// Text state parameters (saved and restored with the graphics state).
#[derive(Debug, Clone)]
pub(crate) struct TextState<'a> {
    pub font: Option<Rc<LoadedFont<'a>>>,
    pub font_size: f64,
    /// Tc
    pub char_spacing: f64,
    /// Tw
    pub word_spacing: f64,
    /// Tz as a fraction.
    pub horizontal_scaling: f64,
    /// TL
    pub leading: f64,
    /// Ts
    pub rise: f64,
    /// Tr
    pub render_mode: i64,
}

impl Default for TextState<'_> {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
            render_mode: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GraphicsState<'a> {
    pub ctm: Matrix,
    pub line_width: f64,
    pub stroking_color: Color,
    pub non_stroking_color: Color,
    pub text: TextState<'a>,
}

impl GraphicsState<'_> {
    pub fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            line_width: 1.0,
            stroking_color: vec![0.0],
            non_stroking_color: vec![0.0],
            text: TextState::default(),
        }
    }
}

/// Initial color for a color space selected with `CS`/`cs`.
pub(crate) fn initial_color(space: &str) -> Color {
    match space {
        "DeviceRGB" | "CalRGB" | "Lab" => vec![0.0, 0.0, 0.0],
        "DeviceCMYK" => vec![0.0, 0.0, 0.0, 1.0],
        _ => vec![0.0],
    }
}

/// One subpath, in user space after the CTM.
#[derive(Debug, Clone, Default)]
pub(crate) struct Subpath {
    pub points: Vec<Point>,
    pub curved: bool,
    pub closed: bool,
    /// Built by `re`.
    pub rect: bool,
}

/// Shape of a painted subpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Line,
    Rect,
    Curve,
}

impl Subpath {
    pub fn classify(&self) -> Option<Shape> {
        if self.points.len() < 2 {
            return None;
        }
        if self.curved {
            return Some(Shape::Curve);
        }

        let mut pts: &[Point] = &self.points;
        if pts.len() > 2 && pts.first() == pts.last() {
            pts = &pts[..pts.len() - 1];
        }

        match pts.len() {
            2 => Some(Shape::Line),
            4 if (self.rect || self.closed || self.points.len() == 5) && is_axis_aligned_box(pts) => {
                Some(Shape::Rect)
            }
            _ => Some(Shape::Curve),
        }
    }
}

fn is_axis_aligned_box(p: &[Point]) -> bool {
    let (a, b, c, d) = (p[0], p[1], p[2], p[3]);
    (a.x == b.x && b.y == c.y && c.x == d.x && d.y == a.y)
        || (a.y == b.y && b.x == c.x && c.y == d.y && d.x == a.x)
}

/// Path under construction between `m`/`re` and a painting operator.
#[derive(Debug, Default)]
pub(crate) struct PathBuilder {
    subpaths: Vec<Subpath>,
}

impl PathBuilder {
    pub fn move_to(&mut self, p: Point) {
        self.subpaths.push(Subpath {
            points: vec![p],
            ..Default::default()
        });
    }

    pub fn line_to(&mut self, p: Point) {
        if let Some(sub) = self.subpaths.last_mut() {
            if !sub.closed {
                sub.points.push(p);
                return;
            }
        }

        // After `h` the current point is the start of the closed subpath.
        let start = self.subpaths.last().and_then(|s| s.points.first().copied());
        match start {
            Some(start) => {
                self.move_to(start);
                if let Some(sub) = self.subpaths.last_mut() {
                    sub.points.push(p);
                }
            }
            None => self.move_to(p),
        }
    }

    pub fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current_point().is_none() {
            self.move_to(c1);
        }
        if let Some(sub) = self.subpaths.last_mut() {
            sub.points.extend([c1, c2, p]);
            sub.curved = true;
        }
    }

    pub fn close(&mut self) {
        if let Some(sub) = self.subpaths.last_mut() {
            if let (Some(&first), Some(&last)) = (sub.points.first(), sub.points.last()) {
                if first != last && sub.points.len() > 2 {
                    sub.points.push(first);
                }
            }
            sub.closed = true;
        }
    }

    /// Append a rectangle given its four transformed corners.
    pub fn rect(&mut self, corners: [Point; 4]) {
        self.subpaths.push(Subpath {
            points: vec![corners[0], corners[1], corners[2], corners[3], corners[0]],
            curved: false,
            closed: true,
            rect: true,
        });
    }

    pub fn current_point(&self) -> Option<Point> {
        self.subpaths.last().and_then(|s| s.points.last().copied())
    }

    /// Hand over the finished subpaths and start afresh.
    pub fn take(&mut self) -> Vec<Subpath> {
        std::mem::take(&mut self.subpaths)
    }
}
