//! Geometry primitives shared by the parser and the extractors.
//!
//! Page-space values use a top-left origin: `x` grows to the right and
//! `top`/`bottom` grow downwards, measured in PDF points.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    /// Create a box, normalising the corner order.
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0: x0.min(x1),
            top: top.min(bottom),
            x1: x0.max(x1),
            bottom: top.max(bottom),
        }
    }

    /// Smallest box containing all points. `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.x0 = bbox.x0.min(p.x);
            bbox.x1 = bbox.x1.max(p.x);
            bbox.top = bbox.top.min(p.y);
            bbox.bottom = bbox.bottom.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Union of two boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Intersection of two boxes, `None` when they do not overlap.
    ///
    /// Touching boxes produce a degenerate (zero-width or zero-height)
    /// intersection so that hairlines on a crop border survive.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let x0 = self.x0.max(other.x0);
        let top = self.top.max(other.top);
        let x1 = self.x1.min(other.x1);
        let bottom = self.bottom.min(other.bottom);
        if x0 <= x1 && top <= bottom {
            Some(BBox { x0, top, x1, bottom })
        } else {
            None
        }
    }

    pub fn overlaps(&self, other: &BBox) -> bool {
        self.intersection(other).is_some()
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BBox) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.top >= self.top && other.bottom <= self.bottom
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.top && p.y <= self.bottom
    }
}

/// A point in page space (`y` grows downwards) or user space, depending
/// on where it comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A PDF transformation matrix `[a b c d e f]`.
///
/// Points are row vectors: `[x y 1] × M`, so `a.multiply(&b)` applies `a`
/// first and `b` second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Build from a six-element slice, `None` for any other length.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [a, b, c, d, e, f] => Some(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => None,
        }
    }

    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_normalises_corners() {
        let b = BBox::new(10.0, 50.0, 0.0, 20.0);
        assert_eq!(b, BBox { x0: 0.0, top: 20.0, x1: 10.0, bottom: 50.0 });
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 30.0);
    }

    #[test]
    fn test_bbox_intersection() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 20.0, 20.0);
        assert_eq!(a.intersection(&b), Some(BBox::new(5.0, 5.0, 10.0, 10.0)));

        let far = BBox::new(30.0, 30.0, 40.0, 40.0);
        assert!(a.intersection(&far).is_none());

        // Shared edge still counts.
        let touching = BBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.overlaps(&touching));
    }

    #[test]
    fn test_bbox_contains() {
        let outer = BBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&BBox::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!outer.contains(&BBox::new(90.0, 90.0, 110.0, 95.0)));
        assert!(outer.contains_point(Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_bbox_from_points() {
        let pts = [Point::new(3.0, 4.0), Point::new(-1.0, 8.0), Point::new(2.0, 0.0)];
        assert_eq!(BBox::from_points(&pts), Some(BBox::new(-1.0, 0.0, 3.0, 8.0)));
        assert!(BBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_matrix_multiply_order() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Matrix::translate(10.0, 5.0);

        // Scale first, then shift.
        let m = scale.multiply(&shift);
        assert_eq!(m.apply(1.0, 1.0), Point::new(12.0, 7.0));

        // Shift first, then scale.
        let m = shift.multiply(&scale);
        assert_eq!(m.apply(1.0, 1.0), Point::new(22.0, 12.0));
    }

    #[test]
    fn test_matrix_from_slice() {
        assert_eq!(
            Matrix::from_slice(&[1.0, 0.0, 0.0, 1.0, 3.0, 4.0]),
            Some(Matrix::translate(3.0, 4.0))
        );
        assert!(Matrix::from_slice(&[1.0, 2.0]).is_none());
    }
}
