//! Timed full-document extraction.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::repr::rate;
use crate::document::Document;
use crate::error::Result;
use crate::extract::{TableSettings, TextOptions};

/// Measurements from one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub path: PathBuf,
    pub pages: usize,
    pub open_time: Duration,
    pub text_time: Duration,
    /// Extracted text length in characters
    pub text_chars: usize,
    pub table_time: Duration,
    pub tables: usize,
    pub object_time: Duration,
    /// Characters, lines and rectangles
    pub objects: usize,
}

impl BenchmarkReport {
    /// Sum of the four timed phases.
    pub fn total_time(&self) -> Duration {
        self.open_time + self.text_time + self.table_time + self.object_time
    }

    pub fn chars_per_sec(&self) -> Option<f64> {
        rate(self.text_chars as f64, self.text_time)
    }

    pub fn objects_per_sec(&self) -> Option<f64> {
        rate(self.objects as f64, self.object_time)
    }

    pub fn pages_per_sec(&self) -> Option<f64> {
        rate(self.pages as f64, self.total_time())
    }
}

/// Benchmark opening and extracting `path`, writing the report to `out`.
pub fn run_benchmark<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<BenchmarkReport> {
    let path = path.as_ref();

    // Warm-up
    Document::open(path)?.close();

    let start = Instant::now();
    let doc = Document::open(path)?;
    let open_time = start.elapsed();

    writeln!(out, "=== pdfprobe Benchmark ===")?;
    writeln!(out, "File: {}", path.display())?;
    writeln!(out, "Pages: {}", doc.page_count())?;
    writeln!(out, "Open time: {:.3}s", open_time.as_secs_f64())?;

    let text_options = TextOptions::default();
    let start = Instant::now();
    let mut text_chars = 0;
    for page in doc.pages() {
        let text = page.extract_text(&text_options)?.unwrap_or_default();
        text_chars += text.chars().count();
    }
    let text_time = start.elapsed();

    writeln!(out, "Text extraction time: {:.3}s", text_time.as_secs_f64())?;
    writeln!(out, "Total text length: {} chars", text_chars)?;
    if let Some(r) = rate(text_chars as f64, text_time) {
        writeln!(out, "Text/sec: {:.0} chars/sec", r)?;
    }

    let table_settings = TableSettings::default();
    let start = Instant::now();
    let mut tables = 0;
    for page in doc.pages() {
        tables += page.extract_tables(&table_settings)?.len();
    }
    let table_time = start.elapsed();

    writeln!(out, "Table extraction time: {:.3}s", table_time.as_secs_f64())?;
    writeln!(out, "Total tables found: {}", tables)?;

    let start = Instant::now();
    let mut objects = 0;
    for page in doc.pages() {
        objects += page.chars()?.len() + page.lines()?.len() + page.rects()?.len();
    }
    let object_time = start.elapsed();

    writeln!(out, "Object extraction time: {:.3}s", object_time.as_secs_f64())?;
    writeln!(out, "Total objects: {}", objects)?;
    if let Some(r) = rate(objects as f64, object_time) {
        writeln!(out, "Objects/sec: {:.0} obj/sec", r)?;
    }

    let report = BenchmarkReport {
        path: path.to_path_buf(),
        pages: doc.page_count(),
        open_time,
        text_time,
        text_chars,
        table_time,
        tables,
        object_time,
        objects,
    };

    writeln!(out)?;
    writeln!(out, "=== Summary ===")?;
    writeln!(out, "Total processing time: {:.3}s", report.total_time().as_secs_f64())?;
    if let Some(r) = report.pages_per_sec() {
        writeln!(out, "Pages/sec: {:.2}", r)?;
    }

    doc.close();
    Ok(report)
}
