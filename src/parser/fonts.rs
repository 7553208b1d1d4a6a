//! Font metrics needed to position glyphs.
//!
//! Only widths and descent are read; glyph outlines are never touched.

use std::collections::HashMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::backend::{name_of, number, resolve};

/// Upper bound on a `/W` range so a corrupt array cannot allocate the world.
const MAX_CID_RANGE: u32 = 0x1_0000;

/// Width and descent information for one font resource.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// `/BaseFont`, or the resource name when the font has none.
    pub base_font: String,
    /// Two-byte character codes (Type0 fonts).
    pub composite: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    /// Glyph-space to text-space factor: 1/1000, or the FontMatrix scale for Type3.
    width_scale: f64,
    /// Descent in glyph units (negative below the baseline).
    descent: f64,
}

impl FontMetrics {
    /// Read metrics from a font dictionary.
    pub fn from_dict(doc: &LopdfDocument, dict: &Dictionary, resource_name: &str) -> Self {
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| name_of(resolve(doc, o)))
            .unwrap_or_default();
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| name_of(resolve(doc, o)))
            .unwrap_or_else(|| resource_name.to_string());

        if subtype == "Type0" {
            return Self::composite(doc, dict, base_font);
        }

        let mut metrics = Self::standard(&base_font);

        let descriptor = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok());
        if let Some(desc) = descriptor {
            if let Some(d) = desc.get(b"Descent").ok().and_then(|o| number(resolve(doc, o))) {
                metrics.descent = d;
            }
            if let Some(w) = desc.get(b"MissingWidth").ok().and_then(|o| number(resolve(doc, o))) {
                metrics.default_width = w;
            }
        }

        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok());
        if let Some(widths) = widths {
            metrics.first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| number(resolve(doc, o)))
                .map(|n| n.max(0.0) as u32)
                .unwrap_or(0);
            metrics.widths = widths
                .iter()
                .map(|w| number(resolve(doc, w)).unwrap_or(metrics.default_width))
                .collect();
        }

        if subtype == "Type3" {
            metrics.descent = 0.0;
            metrics.width_scale = dict
                .get(b"FontMatrix")
                .ok()
                .and_then(|o| resolve(doc, o).as_array().ok())
                .and_then(|m| m.first())
                .and_then(|a| number(resolve(doc, a)))
                .unwrap_or(0.001);
        }

        metrics
    }

    /// Metrics for a font with no usable dictionary, based on its name.
    pub fn standard(base_font: &str) -> Self {
        let family = strip_subset(base_font);
        Self {
            base_font: base_font.to_string(),
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: standard_width(family),
            width_scale: 0.001,
            descent: standard_descent(family),
        }
    }

    fn composite(doc: &LopdfDocument, dict: &Dictionary, base_font: String) -> Self {
        let descendant = dict
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| resolve(doc, o).as_dict().ok());

        let mut metrics = Self {
            base_font,
            composite: true,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: 1000.0,
            width_scale: 0.001,
            descent: 0.0,
        };

        let Some(descendant) = descendant else {
            log::warn!("Type0 font {} has no descendant font", metrics.base_font);
            return metrics;
        };

        if let Some(dw) = descendant.get(b"DW").ok().and_then(|o| number(resolve(doc, o))) {
            metrics.default_width = dw;
        }
        if let Some(w) = descendant.get(b"W").ok().and_then(|o| resolve(doc, o).as_array().ok()) {
            metrics.cid_widths = parse_cid_widths(doc, w);
        }
        if let Some(desc) = descendant
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
        {
            if let Some(d) = desc.get(b"Descent").ok().and_then(|o| number(resolve(doc, o))) {
                metrics.descent = d;
            }
        }

        metrics
    }

    /// Horizontal displacement of a glyph in text space, per unit of font size.
    pub fn width(&self, code: u32) -> f64 {
        let glyph_width = if self.composite {
            self.cid_widths.get(&code).copied().unwrap_or(self.default_width)
        } else {
            code.checked_sub(self.first_char)
                .and_then(|i| self.widths.get(i as usize))
                .copied()
                .unwrap_or(self.default_width)
        };
        glyph_width * self.width_scale
    }

    /// Descent in text space, per unit of font size.
    pub fn descent(&self) -> f64 {
        self.descent * self.width_scale
    }

    /// Split a string operand into character codes.
    pub fn codes<'b>(&self, bytes: &'b [u8]) -> Vec<(u32, &'b [u8])> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|c| {
                    let code = c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                    (code, c)
                })
                .collect()
        } else {
            bytes
                .chunks(1)
                .map(|c| (c[0] as u32, c))
                .collect()
        }
    }
}

/// Text for a code the font's encoding could not map.
pub fn fallback_text(code: u32, composite: bool) -> String {
    if composite {
        char::from_u32(code).unwrap_or('\u{FFFD}').to_string()
    } else {
        ((code & 0xFF) as u8 as char).to_string()
    }
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` and `c_first c_last w` entries.
fn parse_cid_widths(doc: &LopdfDocument, arr: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < arr.len() {
        let Some(first) = number(resolve(doc, &arr[i])).map(|n| n.max(0.0) as u32) else {
            break;
        };
        match arr.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(ws)) => {
                for (j, w) in ws.iter().enumerate() {
                    if let Some(w) = number(resolve(doc, w)) {
                        widths.insert(first + j as u32, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last).map(|n| n.max(0.0) as u32).unwrap_or(first);
                let w = arr.get(i + 2).and_then(|o| number(resolve(doc, o)));
                if let Some(w) = w {
                    let last = last.min(first.saturating_add(MAX_CID_RANGE));
                    for cid in first..=last {
                        widths.insert(cid, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// Drop a subset tag such as `ABCDEF+`.
fn strip_subset(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

fn standard_width(family: &str) -> f64 {
    if family.starts_with("Courier") {
        600.0
    } else {
        500.0
    }
}

fn standard_descent(family: &str) -> f64 {
    if family.starts_with("Courier") {
        -157.0
    } else if family.starts_with("Helvetica") || family.starts_with("Arial") {
        -207.0
    } else if family.starts_with("Times") {
        -217.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_simple_font_widths() {
        let doc = LopdfDocument::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Arial",
            "FirstChar" => Object::Integer(65),
            "Widths" => vec![Object::Integer(667), Object::Integer(722)],
        };
        let font = FontMetrics::from_dict(&doc, &dict, "F1");
        assert_eq!(font.base_font, "ABCDEF+Arial");
        assert!(!font.composite);
        assert!((font.width(65) - 0.667).abs() < 1e-9);
        assert!((font.width(66) - 0.722).abs() < 1e-9);
        // Outside the table: missing width falls back to the family default.
        assert!((font.width(90) - 0.5).abs() < 1e-9);
        assert!((font.descent() + 0.207).abs() < 1e-9);
    }

    #[test]
    fn test_standard_courier() {
        let doc = LopdfDocument::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        };
        let font = FontMetrics::from_dict(&doc, &dict, "F1");
        assert!((font.width(b'A' as u32) - 0.6).abs() < 1e-9);
        assert!((font.descent() + 0.157).abs() < 1e-9);
    }

    #[test]
    fn test_composite_widths() {
        let doc = LopdfDocument::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSansCJK",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "DW" => Object::Integer(900),
                "W" => vec![
                    Object::Integer(1),
                    Object::Array(vec![Object::Integer(250), Object::Integer(300)]),
                    Object::Integer(10),
                    Object::Integer(12),
                    Object::Integer(400),
                ],
            })],
        };
        let font = FontMetrics::from_dict(&doc, &dict, "F2");
        assert!(font.composite);
        assert!((font.width(1) - 0.25).abs() < 1e-9);
        assert!((font.width(2) - 0.3).abs() < 1e-9);
        assert!((font.width(11) - 0.4).abs() < 1e-9);
        assert!((font.width(5) - 0.9).abs() < 1e-9);

        let codes = font.codes(&[0x00, 0x01, 0x30, 0x42]);
        assert_eq!(codes.iter().map(|(c, _)| *c).collect::<Vec<_>>(), vec![1, 0x3042]);
    }

    #[test]
    fn test_type3_font_matrix() {
        let doc = LopdfDocument::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type3",
            "FirstChar" => Object::Integer(0),
            "Widths" => vec![Object::Integer(5)],
            "FontMatrix" => vec![
                Object::Real(0.1), Object::Integer(0), Object::Integer(0),
                Object::Real(0.1), Object::Integer(0), Object::Integer(0),
            ],
        };
        let font = FontMetrics::from_dict(&doc, &dict, "T3");
        assert_eq!(font.base_font, "T3");
        assert!((font.width(0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fallback_text() {
        assert_eq!(fallback_text(0xE9, false), "é");
        assert_eq!(fallback_text(0x3042, true), "あ");
    }

    #[test]
    fn test_strip_subset() {
        assert_eq!(strip_subset("ABCDEF+Courier-Bold"), "Courier-Bold");
        assert_eq!(strip_subset("Foo+Bar"), "Foo+Bar");
    }
}
