//! Plain and layout-preserving text extraction.

use unicode_normalization::UnicodeNormalization;

use super::cluster::cluster_by;
use super::words::{extract_words, WordOptions};
use crate::geometry::BBox;
use crate::model::{Char, Word};

/// Unicode normalization form applied to extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeNorm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl UnicodeNorm {
    fn apply(self, text: &str) -> String {
        match self {
            UnicodeNorm::Nfc => text.nfc().collect(),
            UnicodeNorm::Nfd => text.nfd().collect(),
            UnicodeNorm::Nfkc => text.nfkc().collect(),
            UnicodeNorm::Nfkd => text.nfkd().collect(),
        }
    }
}

/// Options for text extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    /// Maximum horizontal gap between characters of one word
    pub x_tolerance: f64,
    /// Maximum vertical offset between characters of one line
    pub y_tolerance: f64,
    /// Reproduce the page layout with spaces and blank lines
    pub layout: bool,
    /// Points per character column in layout mode
    pub x_density: f64,
    /// Points per text row in layout mode
    pub y_density: f64,
    pub keep_blank_chars: bool,
    pub use_text_flow: bool,
    /// Normalization applied to the result
    pub unicode_norm: Option<UnicodeNorm>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            layout: false,
            x_density: 7.25,
            y_density: 13.0,
            keep_blank_chars: false,
            use_text_flow: false,
            unicode_norm: None,
        }
    }
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x_tolerance(mut self, tolerance: f64) -> Self {
        self.x_tolerance = tolerance;
        self
    }

    pub fn with_y_tolerance(mut self, tolerance: f64) -> Self {
        self.y_tolerance = tolerance;
        self
    }

    /// Enable layout mode.
    pub fn layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_density(mut self, x_density: f64, y_density: f64) -> Self {
        self.x_density = x_density;
        self.y_density = y_density;
        self
    }

    pub fn keep_blank_chars(mut self, keep: bool) -> Self {
        self.keep_blank_chars = keep;
        self
    }

    pub fn use_text_flow(mut self, flow: bool) -> Self {
        self.use_text_flow = flow;
        self
    }

    pub fn with_unicode_norm(mut self, norm: UnicodeNorm) -> Self {
        self.unicode_norm = Some(norm);
        self
    }

    /// The word grouping these options imply.
    pub fn word_options(&self) -> WordOptions {
        WordOptions {
            x_tolerance: self.x_tolerance,
            y_tolerance: self.y_tolerance,
            keep_blank_chars: self.keep_blank_chars,
            use_text_flow: self.use_text_flow,
        }
    }
}

/// Extract the text of `chars`, laid out relative to `bbox` in layout mode.
///
/// Returns `None` when there is no text at all.
pub fn extract_text(chars: &[Char], bbox: &BBox, options: &TextOptions) -> Option<String> {
    let words = extract_words(chars, &options.word_options());
    if words.is_empty() {
        return None;
    }

    let lines = group_lines(words, options);
    let text = if options.layout {
        layout_text(&lines, bbox, options)
    } else {
        lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    Some(match options.unicode_norm {
        Some(norm) => norm.apply(&text),
        None => text,
    })
}

fn group_lines(words: Vec<Word>, options: &TextOptions) -> Vec<Vec<Word>> {
    if !options.use_text_flow {
        return cluster_by(words, |w| w.top, options.y_tolerance)
            .into_iter()
            .map(|mut line| {
                line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
                line
            })
            .collect();
    }

    // Stream order: a new line whenever the baseline moves.
    let mut lines: Vec<Vec<Word>> = Vec::new();
    for word in words {
        match lines.last_mut() {
            Some(line)
                if line
                    .last()
                    .is_some_and(|prev| (word.top - prev.top).abs() <= options.y_tolerance) =>
            {
                line.push(word)
            }
            _ => lines.push(vec![word]),
        }
    }
    lines
}

fn layout_text(lines: &[Vec<Word>], bbox: &BBox, options: &TextOptions) -> String {
    let columns = (bbox.width() / options.x_density).ceil().max(0.0) as usize;
    let rows = (bbox.height() / options.y_density).ceil().max(0.0) as usize;

    let mut out: Vec<String> = Vec::new();
    for line in lines {
        let Some(top) = line.iter().map(|w| w.top).reduce(f64::min) else {
            continue;
        };
        let row = grid_index(top - bbox.top, options.y_density);
        while out.len() < row {
            out.push(" ".repeat(columns));
        }

        let mut text = String::new();
        let mut cursor = 0usize;
        for word in line {
            let gap = usize::from(cursor > 0);
            let col = grid_index(word.x0 - bbox.x0, options.x_density).max(cursor + gap);
            text.extend(std::iter::repeat(' ').take(col - cursor));
            text.push_str(&word.text);
            cursor = col + word.text.chars().count();
        }
        if cursor < columns {
            text.extend(std::iter::repeat(' ').take(columns - cursor));
        }
        out.push(text);
    }

    while out.len() < rows {
        out.push(" ".repeat(columns));
    }
    out.join("\n")
}

fn grid_index(offset: f64, density: f64) -> usize {
    if density <= 0.0 {
        return 0;
    }
    (offset / density).round().max(0.0) as usize
}
