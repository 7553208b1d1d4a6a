//! Table detection from word alignment (stream mode).
//!
//! Tables without ruling lines are found by grouping words into rows,
//! looking for left edges that recur across rows, and keeping runs of rows
//! that line up with those columns.

use std::collections::{HashMap, HashSet};

use crate::geometry::BBox;
use crate::model::{Table, Word};

/// Width of the buckets left edges are rounded into.
const EDGE_BUCKET: f64 = 5.0;

/// How far a word may sit from a column edge and still count as aligned.
const ALIGNMENT_TOLERANCE: f64 = 5.0;

/// Stream table detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamTableConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping words into rows (fraction of word height)
    pub y_tolerance_factor: f64,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f64,
    /// Minimum gap between columns (points)
    pub min_column_gap: f64,
}

impl Default for StreamTableConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// A row of words sharing a baseline.
#[derive(Debug, Clone)]
struct WordRow<'w> {
    top: f64,
    bottom: f64,
    words: Vec<&'w Word>,
}

/// Detects tables in a list of words.
#[derive(Debug, Clone, Default)]
pub struct StreamTableDetector {
    config: StreamTableConfig,
}

impl StreamTableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreamTableConfig) -> Self {
        Self { config }
    }

    /// Detect tables among `words`, top to bottom.
    pub fn detect(&self, words: &[Word]) -> Vec<Table> {
        let cfg = &self.config;
        let min_columns = cfg.min_columns.max(1);
        if words.len() < cfg.min_rows * min_columns {
            log::debug!(
                "stream tables: not enough words ({} < {})",
                words.len(),
                cfg.min_rows * min_columns
            );
            return Vec::new();
        }

        let rows = self.group_into_rows(words);
        if rows.len() < cfg.min_rows {
            log::debug!("stream tables: not enough rows ({})", rows.len());
            return Vec::new();
        }

        let columns = self.detect_columns(&rows);
        log::debug!("stream tables: candidate columns at {:?}", columns);
        if columns.len() < min_columns {
            return Vec::new();
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = &rows[start..=end];

            // Re-detect columns for this specific region.
            let region_columns = self.detect_columns(region);
            if region_columns.len() < min_columns {
                continue;
            }
            if region_columns.len() > cfg.max_columns {
                log::debug!(
                    "stream tables: skipping region, too many columns ({} > {})",
                    region_columns.len(),
                    cfg.max_columns
                );
                continue;
            }
            if self.is_list_pattern(region, &region_columns) {
                log::debug!("stream tables: skipping region, detected as list pattern");
                continue;
            }

            if let Some(table) = self.build_table(region, &region_columns) {
                tables.push(table);
            }
        }
        tables
    }

    /// Group words into rows by `top`, sorted top to bottom then left to right.
    fn group_into_rows<'w>(&self, words: &'w [Word]) -> Vec<WordRow<'w>> {
        let mut sorted: Vec<&Word> = words.iter().collect();
        sorted.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

        let mut rows: Vec<WordRow<'w>> = Vec::new();
        let mut anchor: Option<f64> = None;
        for word in sorted {
            let tolerance = (word.bottom - word.top) * self.config.y_tolerance_factor;
            let same_row = anchor.is_some_and(|top| (word.top - top).abs() <= tolerance);
            match rows.last_mut() {
                Some(row) if same_row => {
                    row.top = row.top.min(word.top);
                    row.bottom = row.bottom.max(word.bottom);
                    row.words.push(word);
                }
                _ => {
                    anchor = Some(word.top);
                    rows.push(WordRow {
                        top: word.top,
                        bottom: word.bottom,
                        words: vec![word],
                    });
                }
            }
        }

        for row in &mut rows {
            row.words.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        }
        rows
    }

    /// Column edges: left edges that recur across rows.
    fn detect_columns(&self, rows: &[WordRow<'_>]) -> Vec<f64> {
        let multi_word_rows: Vec<&WordRow<'_>> =
            rows.iter().filter(|r| r.words.len() >= 2).collect();

        // Too few multi-word rows: count every occurrence instead of one per row.
        let (counts, row_total) = if multi_word_rows.len() >= self.config.min_rows {
            let mut counts: HashMap<i64, usize> = HashMap::new();
            for row in &multi_word_rows {
                let buckets: HashSet<i64> = row.words.iter().map(|w| bucket(w.x0)).collect();
                for b in buckets {
                    *counts.entry(b).or_insert(0) += 1;
                }
            }
            (counts, multi_word_rows.len())
        } else {
            let mut counts: HashMap<i64, usize> = HashMap::new();
            for word in rows.iter().flat_map(|r| r.words.iter()) {
                *counts.entry(bucket(word.x0)).or_insert(0) += 1;
            }
            (counts, rows.len())
        };

        let min_occurrences =
            ((row_total as f64 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f64> = counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(b, _)| b as f64 * EDGE_BUCKET)
            .collect();
        edges.sort_by(f64::total_cmp);

        let mut merged: Vec<f64> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Runs of consecutive rows that line up with the columns.
    fn find_table_regions(&self, rows: &[WordRow<'_>], columns: &[f64]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }
        regions
    }

    /// Whether the region is really a bulleted or numbered list.
    fn is_list_pattern(&self, rows: &[WordRow<'_>], columns: &[f64]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0;
        let mut numbers = 0;
        for row in rows {
            if let Some(first) = row.words.first() {
                let text = first.text.trim();
                if is_bullet_marker(text) {
                    bullets += 1;
                } else if is_number_marker(text) {
                    numbers += 1;
                }
            }
        }

        let bullet_ratio = bullets as f64 / rows.len() as f64;
        let marker_ratio = (bullets + numbers) as f64 / rows.len() as f64;
        // Only two-column regions are rejected for numbers; real tables often
        // start with a numeric column.
        bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
    }

    /// Lay the region out as a full grid of cells.
    fn build_table(&self, rows: &[WordRow<'_>], columns: &[f64]) -> Option<Table> {
        if columns.is_empty() {
            return None;
        }
        let right = rows
            .iter()
            .flat_map(|r| r.words.iter())
            .map(|w| w.x1)
            .reduce(f64::max)?;
        let left = rows
            .iter()
            .flat_map(|r| r.words.iter())
            .map(|w| w.x0)
            .reduce(f64::min)?;

        // Column boundaries follow the words actually assigned to them.
        let mut bounds: Vec<f64> = columns.to_vec();
        let mut lowest: Vec<Option<f64>> = vec![None; columns.len()];
        for word in rows.iter().flat_map(|r| r.words.iter()) {
            let col = find_column(word.x0, columns, right);
            let slot = &mut lowest[col];
            *slot = Some(slot.map_or(word.x0, |x: f64| x.min(word.x0)));
        }
        for (bound, low) in bounds.iter_mut().zip(&lowest) {
            if let Some(low) = low {
                *bound = *low;
            }
        }
        bounds[0] = left;
        for i in 1..bounds.len() {
            if bounds[i] <= bounds[i - 1] {
                bounds[i] = columns[i].max(bounds[i - 1]);
            }
        }
        bounds.push(right);

        let mut cells = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let bottom = rows.get(r + 1).map_or(row.bottom, |next| next.top.max(row.top));
            for pair in bounds.windows(2) {
                if pair[1] > pair[0] {
                    cells.push(BBox::new(pair[0], row.top, pair[1], bottom));
                }
            }
        }
        Table::from_cells(&cells)
    }
}

fn bucket(x: f64) -> i64 {
    (x / EDGE_BUCKET).round() as i64
}

fn alignment_score(row: &WordRow<'_>, columns: &[f64]) -> f64 {
    if row.words.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .words
        .iter()
        .filter(|w| columns.iter().any(|c| (w.x0 - c).abs() <= ALIGNMENT_TOLERANCE))
        .count();
    aligned as f64 / row.words.len() as f64
}

/// Index of the column a word starting at `x` belongs to.
fn find_column(x: f64, columns: &[f64], right: f64) -> usize {
    for (i, &start) in columns.iter().enumerate() {
        let end = columns.get(i + 1).copied().unwrap_or(right + 100.0);
        if x >= start - 10.0 && x < end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|a, b| (x - a.1).abs().total_cmp(&(x - b.1).abs()))
        .map_or(0, |(i, _)| i)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※"
            | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Number-style list markers: `1.`, `2)`, a bare number, `a.`.
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let (digits, suffix) = cleaned.split_at(pos);
        if !digits.is_empty() && (suffix == "." || suffix == ")") {
            return true;
        }
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}
