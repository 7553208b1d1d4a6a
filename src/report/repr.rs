//! Python-style value formatting for the reports.
//!
//! The reports print strings, numbers and the metadata mapping the way a
//! Python interpreter would show them, so output can be compared line by
//! line with pdfplumber's own diagnostic scripts.

use std::fmt::Write as _;
use std::time::Duration;

use crate::model::{Metadata, MetadataValue};

/// Quote `s` like Python's `repr(str)`.
pub fn py_repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => {
                let code = c as u32;
                // Writing to a String cannot fail.
                let _ = if code < 0x100 {
                    write!(out, "\\x{:02x}", code)
                } else if code < 0x1_0000 {
                    write!(out, "\\u{:04x}", code)
                } else {
                    write!(out, "\\U{:08x}", code)
                };
            }
        }
    }
    out.push(quote);
    out
}

fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_control()
        || c.is_whitespace()
        || matches!(c, '\u{ad}' | '\u{200b}'..='\u{200f}' | '\u{2028}'..='\u{202e}' | '\u{feff}'))
}

/// Format a float like Python's `repr(float)`.
pub fn py_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // Rust gives "1e20" / "1.5e-7"; Python wants "1e+20" / "1.5e-07".
        let formatted = format!("{:e}", v);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Format a coordinate: integral values without a decimal point.
pub fn fmt_num(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        py_float(v)
    }
}

fn metadata_value_repr(value: &MetadataValue) -> String {
    match value {
        MetadataValue::Text(s) => py_repr_str(s),
        MetadataValue::Integer(i) => i.to_string(),
        MetadataValue::Real(r) => py_float(*r),
        MetadataValue::Boolean(true) => "True".to_string(),
        MetadataValue::Boolean(false) => "False".to_string(),
        MetadataValue::Array(items) => {
            let inner: Vec<String> = items.iter().map(metadata_value_repr).collect();
            format!("[{}]", inner.join(", "))
        }
    }
}

/// Render metadata as a Python dict literal.
pub fn metadata_repr(metadata: &Metadata) -> String {
    let entries: Vec<String> = metadata
        .iter()
        .map(|(k, v)| format!("{}: {}", py_repr_str(k), metadata_value_repr(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// The first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Throughput per second, or `None` when no time elapsed.
pub fn rate(count: f64, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        Some(count / secs)
    } else {
        None
    }
}
