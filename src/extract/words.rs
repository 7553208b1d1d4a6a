//! Word extraction.

use super::cluster::cluster_by;
use crate::model::{Char, Word};

/// Options for grouping characters into words.
#[derive(Debug, Clone, PartialEq)]
pub struct WordOptions {
    /// Maximum horizontal gap between characters of one word
    pub x_tolerance: f64,
    /// Maximum vertical offset between characters of one line
    pub y_tolerance: f64,
    /// Keep whitespace characters inside words instead of splitting on them
    pub keep_blank_chars: bool,
    /// Follow the content stream order instead of sorting into lines
    pub use_text_flow: bool,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            keep_blank_chars: false,
            use_text_flow: false,
        }
    }
}

impl WordOptions {
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

    pub fn keep_blank_chars(mut self, keep: bool) -> Self {
        self.keep_blank_chars = keep;
        self
    }

    pub fn use_text_flow(mut self, flow: bool) -> Self {
        self.use_text_flow = flow;
        self
    }
}

/// Group characters into words.
///
/// Words are returned line by line, top to bottom, left to right within a
/// line (or in content stream order with `use_text_flow`).
pub fn extract_words(chars: &[Char], options: &WordOptions) -> Vec<Word> {
    let lines: Vec<Vec<Char>> = if options.use_text_flow {
        vec![chars.to_vec()]
    } else {
        cluster_by(chars.to_vec(), |c| c.top, options.y_tolerance)
            .into_iter()
            .map(|mut line| {
                line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
                line
            })
            .collect()
    };

    let mut words = Vec::new();
    for line in lines {
        let mut current: Vec<Char> = Vec::new();
        for c in line {
            if !options.keep_blank_chars && c.is_blank() {
                flush(&mut current, &mut words);
                continue;
            }
            if let Some(prev) = current.last() {
                if begins_new_word(prev, &c, options) {
                    flush(&mut current, &mut words);
                }
            }
            current.push(c);
        }
        flush(&mut current, &mut words);
    }
    words
}

fn begins_new_word(prev: &Char, curr: &Char, options: &WordOptions) -> bool {
    prev.upright != curr.upright
        || curr.x0 > prev.x1 + options.x_tolerance
        || curr.x0 < prev.x0
        || (curr.top - prev.top).abs() > options.y_tolerance
}

fn flush(current: &mut Vec<Char>, words: &mut Vec<Word>) {
    if let Some(word) = Word::from_chars(std::mem::take(current)) {
        words.push(word);
    }
}
