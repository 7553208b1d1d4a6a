//! Table finding.
//!
//! The lattice strategies build tables from ruling lines: page lines,
//! rectangle sides and straight curve segments become edges, edges are
//! snapped and joined, their intersections give cell corners, and cells
//! sharing corners are grouped into tables. The text strategy delegates to
//! the stream detector.

use super::cluster::cluster_by;
use super::stream_tables::{StreamTableConfig, StreamTableDetector};
use super::text::{extract_text, TextOptions};
use super::words::{extract_words, WordOptions};
use crate::geometry::{BBox, Point};
use crate::model::{Char, PageObjects, Table};

/// How table boundaries are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStrategy {
    /// Lines, rectangle sides and straight curve segments
    #[default]
    Lines,
    /// Line objects only
    LinesStrict,
    /// Alignment of words, without ruling lines
    Text,
}

/// Table finding settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSettings {
    pub strategy: TableStrategy,
    /// Parallel edges this close are moved onto a common position
    pub snap_tolerance: f64,
    /// Collinear edges this close are merged
    pub join_tolerance: f64,
    /// Edges shorter than this are discarded after joining
    pub edge_min_length: f64,
    /// How far apart a vertical and a horizontal edge may be and still intersect
    pub intersection_tolerance: f64,
    /// Settings for [`TableStrategy::Text`]
    pub stream: StreamTableConfig,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            strategy: TableStrategy::Lines,
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            intersection_tolerance: 3.0,
            stream: StreamTableConfig::default(),
        }
    }
}

impl TableSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: TableStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_tolerance = tolerance;
        self
    }

    pub fn with_join_tolerance(mut self, tolerance: f64) -> Self {
        self.join_tolerance = tolerance;
        self
    }

    pub fn with_edge_min_length(mut self, length: f64) -> Self {
        self.edge_min_length = length;
        self
    }

    pub fn with_intersection_tolerance(mut self, tolerance: f64) -> Self {
        self.intersection_tolerance = tolerance;
        self
    }

    pub fn with_stream_config(mut self, config: StreamTableConfig) -> Self {
        self.stream = config;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned ruling segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Edge {
    orientation: Orientation,
    x0: f64,
    top: f64,
    x1: f64,
    bottom: f64,
}

impl Edge {
    /// Edge between two points, if they are axis-aligned and distinct.
    fn between(a: Point, b: Point) -> Option<Self> {
        if a.y == b.y && a.x != b.x {
            Some(Self {
                orientation: Orientation::Horizontal,
                x0: a.x.min(b.x),
                top: a.y,
                x1: a.x.max(b.x),
                bottom: a.y,
            })
        } else if a.x == b.x && a.y != b.y {
            Some(Self {
                orientation: Orientation::Vertical,
                x0: a.x,
                top: a.y.min(b.y),
                x1: a.x,
                bottom: a.y.max(b.y),
            })
        } else {
            None
        }
    }

    /// Start and end along the edge's direction.
    fn span(&self) -> (f64, f64) {
        match self.orientation {
            Orientation::Horizontal => (self.x0, self.x1),
            Orientation::Vertical => (self.top, self.bottom),
        }
    }

    fn length(&self) -> f64 {
        let (start, end) = self.span();
        end - start
    }

    fn extend_to(&mut self, other: &Edge) {
        match self.orientation {
            Orientation::Horizontal => self.x1 = self.x1.max(other.x1),
            Orientation::Vertical => self.bottom = self.bottom.max(other.bottom),
        }
    }
}

/// A point where at least one horizontal and one vertical edge cross.
#[derive(Debug, Clone)]
struct Intersection {
    point: Point,
    horizontal: Vec<usize>,
    vertical: Vec<usize>,
}

/// Find tables among a page's objects.
pub fn find_tables(objects: &PageObjects, settings: &TableSettings) -> Vec<Table> {
    if settings.strategy == TableStrategy::Text {
        let words = extract_words(&objects.chars, &WordOptions::default());
        return StreamTableDetector::with_config(settings.stream.clone()).detect(&words);
    }

    let edges = collect_edges(objects, settings.strategy);
    let edges = merge_edges(edges, settings);
    log::debug!("table finder: {} edges after merging", edges.len());

    let intersections = find_intersections(&edges, settings.intersection_tolerance);
    let cells = intersections_to_cells(&intersections);
    log::debug!(
        "table finder: {} intersections, {} cells",
        intersections.len(),
        cells.len()
    );

    cells_to_tables(&cells)
        .into_iter()
        .filter_map(|group| Table::from_cells(&group))
        .collect()
}

impl Table {
    /// The text of every cell, row by row; `None` where the grid has no cell.
    pub fn extract(&self, chars: &[Char]) -> Vec<Vec<Option<String>>> {
        let options = TextOptions::default();
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| {
                        cell.map(|bbox| {
                            let inside: Vec<Char> = chars
                                .iter()
                                .filter(|c| bbox.contains_point(char_center(c)))
                                .cloned()
                                .collect();
                            extract_text(&inside, &bbox, &options).unwrap_or_default()
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

fn char_center(c: &Char) -> Point {
    Point::new((c.x0 + c.x1) / 2.0, (c.top + c.bottom) / 2.0)
}

fn collect_edges(objects: &PageObjects, strategy: TableStrategy) -> Vec<Edge> {
    let mut edges: Vec<Edge> = objects
        .lines
        .iter()
        .filter_map(|l| {
            Edge::between(Point::new(l.x0, l.top), Point::new(l.x1, l.bottom))
        })
        .collect();

    if strategy == TableStrategy::LinesStrict {
        return edges;
    }

    for r in &objects.rects {
        let corners = [
            Point::new(r.x0, r.top),
            Point::new(r.x1, r.top),
            Point::new(r.x1, r.bottom),
            Point::new(r.x0, r.bottom),
        ];
        for i in 0..4 {
            edges.extend(Edge::between(corners[i], corners[(i + 1) % 4]));
        }
    }

    for curve in &objects.curves {
        edges.extend(
            curve
                .points
                .windows(2)
                .filter_map(|pair| Edge::between(pair[0], pair[1])),
        );
    }

    edges
}

/// Snap, join and length-filter the edges.
fn merge_edges(edges: Vec<Edge>, settings: &TableSettings) -> Vec<Edge> {
    let (horizontal, vertical): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);

    let mut merged = Vec::new();
    for group in cluster_by(horizontal, |e| e.top, settings.snap_tolerance) {
        let at = mean(group.iter().map(|e| e.top));
        let snapped = group.into_iter().map(|e| Edge { top: at, bottom: at, ..e }).collect();
        merged.extend(join_collinear(snapped, settings.join_tolerance));
    }
    for group in cluster_by(vertical, |e| e.x0, settings.snap_tolerance) {
        let at = mean(group.iter().map(|e| e.x0));
        let snapped = group.into_iter().map(|e| Edge { x0: at, x1: at, ..e }).collect();
        merged.extend(join_collinear(snapped, settings.join_tolerance));
    }

    merged.retain(|e| e.length() >= settings.edge_min_length);
    merged
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Merge overlapping or nearly touching edges that share a position.
fn join_collinear(mut edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    edges.sort_by(|a, b| a.span().0.total_cmp(&b.span().0));

    let mut joined: Vec<Edge> = Vec::new();
    for edge in edges {
        match joined.last_mut() {
            Some(last) if edge.span().0 <= last.span().1 + tolerance => last.extend_to(&edge),
            _ => joined.push(edge),
        }
    }
    joined
}

fn find_intersections(edges: &[Edge], tolerance: f64) -> Vec<Intersection> {
    let mut found: Vec<Intersection> = Vec::new();
    for (vi, v) in edges.iter().enumerate() {
        if v.orientation != Orientation::Vertical {
            continue;
        }
        for (hi, h) in edges.iter().enumerate() {
            if h.orientation != Orientation::Horizontal {
                continue;
            }
            let crosses = v.top <= h.top + tolerance
                && v.bottom >= h.top - tolerance
                && v.x0 >= h.x0 - tolerance
                && v.x0 <= h.x1 + tolerance;
            if !crosses {
                continue;
            }
            let point = Point::new(v.x0, h.top);
            match found.iter_mut().find(|i| i.point == point) {
                Some(existing) => {
                    existing.horizontal.push(hi);
                    existing.vertical.push(vi);
                }
                None => found.push(Intersection {
                    point,
                    horizontal: vec![hi],
                    vertical: vec![vi],
                }),
            }
        }
    }
    found.sort_by(|a, b| {
        a.point
            .y
            .total_cmp(&b.point.y)
            .then(a.point.x.total_cmp(&b.point.x))
    });
    found
}

fn shares_edge(a: &Intersection, b: &Intersection) -> bool {
    if a.point.x == b.point.x {
        a.vertical.iter().any(|e| b.vertical.contains(e))
    } else if a.point.y == b.point.y {
        a.horizontal.iter().any(|e| b.horizontal.contains(e))
    } else {
        false
    }
}

/// The smallest rectangles whose corners are connected intersections.
fn intersections_to_cells(intersections: &[Intersection]) -> Vec<BBox> {
    let mut cells = Vec::new();
    for (i, corner) in intersections.iter().enumerate() {
        let rest = &intersections[i + 1..];
        let below = rest.iter().filter(|p| p.point.x == corner.point.x);
        let right: Vec<&Intersection> = rest
            .iter()
            .filter(|p| p.point.y == corner.point.y)
            .collect();

        'below: for b in below {
            if !shares_edge(corner, b) {
                continue;
            }
            for r in &right {
                if !shares_edge(corner, r) {
                    continue;
                }
                let far = Point::new(r.point.x, b.point.y);
                let Some(opposite) = intersections.iter().find(|p| p.point == far) else {
                    continue;
                };
                if shares_edge(opposite, r) && shares_edge(opposite, b) {
                    cells.push(BBox::new(corner.point.x, corner.point.y, far.x, far.y));
                    break 'below;
                }
            }
        }
    }
    cells
}

/// Group cells that share at least one corner; single cells are dropped.
fn cells_to_tables(cells: &[BBox]) -> Vec<Vec<BBox>> {
    fn corners(c: &BBox) -> [Point; 4] {
        [
            Point::new(c.x0, c.top),
            Point::new(c.x1, c.top),
            Point::new(c.x0, c.bottom),
            Point::new(c.x1, c.bottom),
        ]
    }

    let mut groups: Vec<(Vec<Point>, Vec<BBox>)> = Vec::new();
    for cell in cells {
        let cell_corners = corners(cell);
        let (touching, mut rest): (Vec<_>, Vec<_>) = groups
            .into_iter()
            .partition(|(points, _)| cell_corners.iter().any(|c| points.contains(c)));

        let mut merged = (cell_corners.to_vec(), vec![*cell]);
        for (points, members) in touching {
            merged.0.extend(points);
            merged.1.extend(members);
        }
        rest.push(merged);
        groups = rest;
    }

    let mut tables: Vec<Vec<BBox>> = groups
        .into_iter()
        .map(|(_, members)| members)
        .filter(|members| members.len() > 1)
        .collect();
    tables.sort_by(|a, b| {
        let (ta, tb) = (top_left(a), top_left(b));
        ta.y.total_cmp(&tb.y).then(ta.x.total_cmp(&tb.x))
    });
    tables
}

fn top_left(cells: &[BBox]) -> Point {
    cells.iter().fold(Point::new(f64::MAX, f64::MAX), |acc, c| {
        Point::new(acc.x.min(c.x0), acc.y.min(c.top))
    })
}
