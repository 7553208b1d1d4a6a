//! Content-stream interpretation.
//!
//! Walks the operators of a page (and of the form XObjects it draws),
//! tracking the graphics and text state, and records every glyph, painted
//! path and image as a positioned primitive in page space.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::backend::{name_of, number, resolve, stream_bytes, PageGeometry};
use super::fonts::fallback_text;
use super::state::{initial_color, GraphicsState, LoadedFont, PathBuilder, Shape, Subpath};
use crate::error::{Error, Result};
use crate::geometry::{BBox, Matrix, Point};
use crate::model::{Char, Curve, Image, Line, PageObjects, Rect};

/// Interpret a page content stream.
pub(crate) fn interpret(
    doc: &LopdfDocument,
    content: &[u8],
    resources: Option<&Dictionary>,
    geometry: &PageGeometry,
    max_form_depth: usize,
) -> Result<PageObjects> {
    let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;
    let mut interpreter = Interpreter::new(doc, geometry, max_form_depth);
    interpreter.run(&content.operations, resources, 0);
    Ok(interpreter.objects)
}

struct Interpreter<'a> {
    doc: &'a LopdfDocument,
    /// MediaBox left edge and top edge in user space.
    origin: (f64, f64),
    max_form_depth: usize,
    fonts: HashMap<ObjectId, Rc<LoadedFont<'a>>>,
    state: GraphicsState<'a>,
    stack: Vec<GraphicsState<'a>>,
    /// Stack depth a `Q` may not pop below (the caller's saves while a form runs).
    stack_floor: usize,
    /// Text matrix and text line matrix.
    tm: Matrix,
    tlm: Matrix,
    path: PathBuilder,
    objects: PageObjects,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a LopdfDocument, geometry: &PageGeometry, max_form_depth: usize) -> Self {
        Self {
            doc,
            origin: (geometry.mediabox[0], geometry.mediabox[3]),
            max_form_depth,
            fonts: HashMap::new(),
            state: GraphicsState::new(Matrix::identity()),
            stack: Vec::new(),
            stack_floor: 0,
            tm: Matrix::identity(),
            tlm: Matrix::identity(),
            path: PathBuilder::default(),
            objects: PageObjects::default(),
        }
    }

    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: usize) {
        for op in operations {
            self.execute(op, resources, depth);
        }
    }

    fn execute(&mut self, op: &Operation, resources: Option<&'a Dictionary>, depth: usize) {
        let operands = &op.operands;
        let nums: Vec<f64> = operands.iter().filter_map(number).collect();

        match op.operator.as_str() {
            // Graphics state
            "q" => self.stack.push(self.state.clone()),
            "Q" if self.stack.len() > self.stack_floor => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "Q" => log::debug!("unbalanced Q ignored"),
            "cm" => {
                if let Some(m) = Matrix::from_slice(&nums) {
                    self.state.ctm = m.multiply(&self.state.ctm);
                }
            }
            "w" => {
                if let Some(&w) = nums.first() {
                    self.state.line_width = w;
                }
            }
            "gs" => self.apply_ext_gstate(operands.first(), resources),

            // Color
            "G" | "RG" | "K" | "SC" | "SCN" => {
                if !nums.is_empty() {
                    self.state.stroking_color = nums;
                }
            }
            "g" | "rg" | "k" | "sc" | "scn" => {
                if !nums.is_empty() {
                    self.state.non_stroking_color = nums;
                }
            }
            "CS" => {
                if let Some(space) = operands.first().and_then(name_of) {
                    self.state.stroking_color = initial_color(&space);
                }
            }
            "cs" => {
                if let Some(space) = operands.first().and_then(name_of) {
                    self.state.non_stroking_color = initial_color(&space);
                }
            }

            // Path construction
            "m" => {
                if let [x, y, ..] = nums[..] {
                    let p = self.state.ctm.apply(x, y);
                    self.path.move_to(p);
                }
            }
            "l" => {
                if let [x, y, ..] = nums[..] {
                    let p = self.state.ctm.apply(x, y);
                    self.path.line_to(p);
                }
            }
            "c" => {
                if let [x1, y1, x2, y2, x3, y3, ..] = nums[..] {
                    let ctm = self.state.ctm;
                    self.path
                        .curve_to(ctm.apply(x1, y1), ctm.apply(x2, y2), ctm.apply(x3, y3));
                }
            }
            "v" => {
                if let [x2, y2, x3, y3, ..] = nums[..] {
                    let ctm = self.state.ctm;
                    let start = self.path.current_point().unwrap_or_else(|| ctm.apply(x2, y2));
                    self.path.curve_to(start, ctm.apply(x2, y2), ctm.apply(x3, y3));
                }
            }
            "y" => {
                if let [x1, y1, x3, y3, ..] = nums[..] {
                    let ctm = self.state.ctm;
                    let end = ctm.apply(x3, y3);
                    self.path.curve_to(ctm.apply(x1, y1), end, end);
                }
            }
            "h" => self.path.close(),
            "re" => {
                if let [x, y, w, h, ..] = nums[..] {
                    let ctm = self.state.ctm;
                    self.path.rect([
                        ctm.apply(x, y),
                        ctm.apply(x + w, y),
                        ctm.apply(x + w, y + h),
                        ctm.apply(x, y + h),
                    ]);
                }
            }

            // Path painting
            "S" => self.paint(true, false, false),
            "s" => self.paint(true, false, true),
            "f" | "F" | "f*" => self.paint(false, true, true),
            "B" | "B*" => self.paint(true, true, true),
            "b" | "b*" => self.paint(true, true, true),
            "n" => {
                self.path.take();
            }

            // Text objects
            "BT" => {
                self.tm = Matrix::identity();
                self.tlm = Matrix::identity();
            }
            "ET" => {}

            // Text state
            "Tc" => {
                if let Some(&v) = nums.first() {
                    self.state.text.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(&v) = nums.first() {
                    self.state.text.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(&v) = nums.first() {
                    self.state.text.horizontal_scaling = v / 100.0;
                }
            }
            "TL" => {
                if let Some(&v) = nums.first() {
                    self.state.text.leading = v;
                }
            }
            "Ts" => {
                if let Some(&v) = nums.first() {
                    self.state.text.rise = v;
                }
            }
            "Tr" => {
                if let Some(&v) = nums.first() {
                    self.state.text.render_mode = v as i64;
                }
            }
            "Tf" => {
                if let (Some(Object::Name(name)), Some(size)) =
                    (operands.first(), operands.get(1).and_then(number))
                {
                    let font = self.load_font(name, resources);
                    self.state.text.font = Some(font);
                    self.state.text.font_size = size;
                }
            }

            // Text positioning
            "Td" => {
                if let [tx, ty, ..] = nums[..] {
                    self.move_text(tx, ty);
                }
            }
            "TD" => {
                if let [tx, ty, ..] = nums[..] {
                    self.state.text.leading = -ty;
                    self.move_text(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_slice(&nums) {
                    self.tm = m;
                    self.tlm = m;
                }
            }
            "T*" => self.next_line(),

            // Text showing
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show_text(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_text_array(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show_text(bytes);
                }
            }
            "\"" => {
                if let [aw, ac, ..] = nums[..] {
                    self.state.text.word_spacing = aw;
                    self.state.text.char_spacing = ac;
                }
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show_text(bytes);
                }
            }

            // XObjects
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.draw_xobject(name, resources, depth);
                }
            }

            _ => {}
        }
    }

    fn move_text(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_text(0.0, -leading);
    }

    /// Page-space point from a user-space point.
    fn to_page(&self, p: Point) -> Point {
        Point::new(p.x - self.origin.0, self.origin.1 - p.y)
    }

    fn to_page_bbox(&self, user: BBox) -> BBox {
        BBox::new(
            user.x0 - self.origin.0,
            self.origin.1 - user.bottom,
            user.x1 - self.origin.0,
            self.origin.1 - user.top,
        )
    }

    fn load_font(&mut self, name: &[u8], resources: Option<&'a Dictionary>) -> Rc<LoadedFont<'a>> {
        let doc = self.doc;
        let resource_name = String::from_utf8_lossy(name).into_owned();
        let entry = resources
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok());

        match entry {
            Some(Object::Reference(id)) => {
                if let Some(font) = self.fonts.get(id) {
                    return Rc::clone(font);
                }
                let dict = doc.get_dictionary(*id).ok();
                let font = Rc::new(LoadedFont::new(doc, dict, &resource_name));
                self.fonts.insert(*id, Rc::clone(&font));
                font
            }
            Some(Object::Dictionary(dict)) => Rc::new(LoadedFont::new(doc, Some(dict), &resource_name)),
            _ => {
                log::warn!("font /{} not found in resources, using default metrics", resource_name);
                Rc::new(LoadedFont::new(doc, None, &resource_name))
            }
        }
    }

    fn show_text_array(&mut self, items: &[Object]) {
        for item in items {
            match item {
                Object::String(bytes, _) => self.show_text(bytes),
                other => {
                    if let Some(n) = number(other) {
                        let ts = &self.state.text;
                        let tx = -n / 1000.0 * ts.font_size * ts.horizontal_scaling;
                        self.tm = Matrix::translate(tx, 0.0).multiply(&self.tm);
                    }
                }
            }
        }
    }

    fn show_text(&mut self, bytes: &[u8]) {
        let font = match &self.state.text.font {
            Some(font) => Rc::clone(font),
            None => {
                log::debug!("text shown before Tf, using default metrics");
                let font = Rc::new(LoadedFont::new(self.doc, None, "Helvetica"));
                self.state.text.font = Some(Rc::clone(&font));
                font
            }
        };

        let ts = self.state.text.clone();
        let tfs = ts.font_size;
        let th = ts.horizontal_scaling;
        let descent = font.metrics.descent() * tfs;
        let composite = font.metrics.composite;

        for (code, raw) in font.metrics.codes(bytes) {
            let w0 = font.metrics.width(code);
            let text = font.decode(raw).unwrap_or_else(|| fallback_text(code, composite));

            let m = self.tm.multiply(&self.state.ctm);
            let adv = w0 * tfs * th;
            let low = descent + ts.rise;
            let high = low + tfs;
            let corners = [
                m.apply(0.0, low),
                m.apply(adv, low),
                m.apply(adv, high),
                m.apply(0.0, high),
            ];
            if let Some(user) = BBox::from_points(&corners) {
                let bbox = self.to_page_bbox(user);
                let trm = Matrix::new(tfs * th, 0.0, 0.0, tfs, 0.0, ts.rise).multiply(&m);
                let upright = m.a * m.d * th > 0.0 && m.b * m.c <= 0.0;
                self.objects.chars.push(Char {
                    text,
                    x0: bbox.x0,
                    top: bbox.top,
                    x1: bbox.x1,
                    bottom: bbox.bottom,
                    fontname: font.metrics.base_font.clone(),
                    size: if upright { bbox.height() } else { bbox.width() },
                    upright,
                    adv,
                    stroking_color: self.state.stroking_color.clone(),
                    non_stroking_color: self.state.non_stroking_color.clone(),
                    matrix: trm.to_array(),
                });
            }

            let word_space = if !composite && code == 32 {
                ts.word_spacing
            } else {
                0.0
            };
            let tx = (w0 * tfs + ts.char_spacing + word_space) * th;
            self.tm = Matrix::translate(tx, 0.0).multiply(&self.tm);
        }
    }

    fn paint(&mut self, stroke: bool, fill: bool, close: bool) {
        if close {
            self.path.close();
        }
        let subpaths = self.path.take();
        for sub in &subpaths {
            self.emit_path(sub, stroke, fill);
        }
    }

    fn emit_path(&mut self, sub: &Subpath, stroke: bool, fill: bool) {
        let Some(shape) = sub.classify() else {
            return;
        };
        let points: Vec<Point> = sub.points.iter().map(|&p| self.to_page(p)).collect();
        let Some(bbox) = BBox::from_points(&points) else {
            return;
        };
        let linewidth = self.state.line_width;
        let stroking_color = self.state.stroking_color.clone();
        let non_stroking_color = self.state.non_stroking_color.clone();

        match shape {
            Shape::Line => self.objects.lines.push(Line {
                x0: bbox.x0,
                top: bbox.top,
                x1: bbox.x1,
                bottom: bbox.bottom,
                points,
                linewidth,
                stroke,
                stroking_color,
            }),
            Shape::Rect => self.objects.rects.push(Rect {
                x0: bbox.x0,
                top: bbox.top,
                x1: bbox.x1,
                bottom: bbox.bottom,
                linewidth,
                stroke,
                fill,
                stroking_color,
                non_stroking_color,
            }),
            Shape::Curve => self.objects.curves.push(Curve {
                x0: bbox.x0,
                top: bbox.top,
                x1: bbox.x1,
                bottom: bbox.bottom,
                points,
                linewidth,
                stroke,
                fill,
                stroking_color,
                non_stroking_color,
            }),
        }
    }

    fn apply_ext_gstate(&mut self, name: Option<&Object>, resources: Option<&'a Dictionary>) {
        let doc = self.doc;
        let Some(Object::Name(name)) = name else {
            return;
        };
        let gs = resources
            .and_then(|r| r.get(b"ExtGState").ok())
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|d| d.get(name).ok())
            .and_then(|o| resolve(doc, o).as_dict().ok());
        if let Some(lw) = gs.and_then(|d| d.get(b"LW").ok()).and_then(number) {
            self.state.line_width = lw;
        }
    }

    fn draw_xobject(&mut self, name: &[u8], resources: Option<&'a Dictionary>, depth: usize) {
        let doc = self.doc;
        let stream = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|d| d.get(name).ok())
            .and_then(|o| resolve(doc, o).as_stream().ok());
        let Some(stream) = stream else {
            log::debug!("XObject /{} not found", String::from_utf8_lossy(name));
            return;
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(name_of)
            .unwrap_or_default();

        match subtype.as_str() {
            "Image" => self.record_image(name, &stream.dict),
            "Form" => {
                if depth >= self.max_form_depth {
                    log::warn!(
                        "form XObject /{} nested deeper than {}, skipped",
                        String::from_utf8_lossy(name),
                        self.max_form_depth
                    );
                    return;
                }
                let content = match stream_bytes(stream).and_then(|data| {
                    Content::decode(&data).map_err(|e| Error::PdfParse(e.to_string()))
                }) {
                    Ok(content) => content,
                    Err(e) => {
                        log::warn!("form XObject /{}: {}", String::from_utf8_lossy(name), e);
                        return;
                    }
                };

                let matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| resolve(doc, o).as_array().ok())
                    .and_then(|arr| {
                        let values: Vec<f64> = arr.iter().filter_map(number).collect();
                        Matrix::from_slice(&values)
                    })
                    .unwrap_or_default();
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|o| resolve(doc, o).as_dict().ok())
                    .or(resources);

                let saved = self.state.clone();
                let (tm, tlm) = (self.tm, self.tlm);
                let floor = std::mem::replace(&mut self.stack_floor, self.stack.len());

                self.state.ctm = matrix.multiply(&self.state.ctm);
                self.path.take();
                self.run(&content.operations, form_resources, depth + 1);

                // Saves the form left open are discarded with it.
                self.stack.truncate(self.stack_floor);
                self.stack_floor = floor;
                self.state = saved;
                self.tm = tm;
                self.tlm = tlm;
            }
            other => log::debug!("ignoring XObject subtype {:?}", other),
        }
    }

    fn record_image(&mut self, name: &[u8], dict: &Dictionary) {
        let ctm = self.state.ctm;
        let corners = [
            ctm.apply(0.0, 0.0),
            ctm.apply(1.0, 0.0),
            ctm.apply(1.0, 1.0),
            ctm.apply(0.0, 1.0),
        ];
        let Some(user) = BBox::from_points(&corners) else {
            return;
        };
        let bbox = self.to_page_bbox(user);

        let int = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| resolve(self.doc, o).as_i64().ok())
        };
        let srcsize = int(b"Width").zip(int(b"Height"));
        let bits = int(b"BitsPerComponent");
        let colorspace = dict.get(b"ColorSpace").ok().and_then(|o| match resolve(self.doc, o) {
            Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
            Object::Array(arr) => arr.first().and_then(name_of),
            _ => None,
        });

        self.objects.images.push(Image {
            x0: bbox.x0,
            top: bbox.top,
            x1: bbox.x1,
            bottom: bbox.bottom,
            name: String::from_utf8_lossy(name).into_owned(),
            srcsize,
            colorspace,
            bits,
        });
    }
}
