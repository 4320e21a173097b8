//! Closed polygon (loop) representation and metrics.
//!
//! A [`Polygon`] is an ordered sequence of points whose last point
//! implicitly connects back to the first. Widdershins (counter-clockwise)
//! loops have positive signed area and describe outer boundaries; clockwise
//! loops describe holes.

use crate::bounds::Bounds;
use crate::error::{GeometryError, Result};
use crate::point::Point2D;
use serde::{Deserialize, Serialize};

/// A closed loop of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonRecord")]
pub struct Polygon {
    points: Vec<Point2D>,
}

/// Unchecked serialized form; deserializing goes through [`Polygon::new`].
#[derive(Deserialize)]
struct PolygonRecord {
    points: Vec<Point2D>,
}

impl TryFrom<PolygonRecord> for Polygon {
    type Error = GeometryError;

    fn try_from(record: PolygonRecord) -> Result<Self> {
        Self::new(record.points)
    }
}

impl Polygon {
    /// Creates a polygon from an ordered point list.
    ///
    /// Consecutive duplicates are accepted here; run
    /// [`Polygon::dedup_consecutive`] or a simplifier to remove them.
    pub fn new(points: Vec<Point2D>) -> Result<Self> {
        if points.is_empty() {
            return Err(GeometryError::EmptyPolygon);
        }
        Ok(Self { points })
    }

    /// Convenience constructor from coordinate pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::new(coords.iter().copied().map(Point2D::from).collect())
    }

    /// Axis-aligned rectangle wound widdershins.
    pub fn rectangle(min: Point2D, max: Point2D) -> Self {
        Self {
            points: vec![
                min,
                Point2D::new(max.x, min.y),
                max,
                Point2D::new(min.x, max.y),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2D> {
        self.points
    }

    /// Iterates the closed edge list, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area; positive for widdershins loops.
    pub fn signed_area(&self) -> f64 {
        self.edges().map(|(a, b)| a.cross(b)).sum::<f64>() / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_widdershins(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Length of the closed outline.
    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| a.distance_to(b)).sum()
    }

    pub fn bounds(&self) -> Bounds {
        let first = self.points[0];
        let mut bounds = Bounds::new(first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            bounds.include(*p);
        }
        bounds
    }

    /// Index of the point with the smallest x, lowest y on ties.
    pub fn leftmost_index(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.points.iter().enumerate().skip(1) {
            let b = self.points[best];
            if p.x < b.x || (p.x == b.x && p.y < b.y) {
                best = i;
            }
        }
        best
    }

    pub fn leftmost_point(&self) -> Point2D {
        self.points[self.leftmost_index()]
    }

    /// Mean of the vertices.
    pub fn centroid(&self) -> Point2D {
        let sum = self
            .points
            .iter()
            .fold(Point2D::default(), |acc, p| acc + *p);
        sum * (1.0 / self.points.len() as f64)
    }

    pub fn reversed(&self) -> Polygon {
        let mut points = self.points.clone();
        points.reverse();
        Polygon { points }
    }

    /// Every point rotated by the unit vector `rotation`.
    pub fn rotated(&self, rotation: Point2D) -> Polygon {
        Polygon {
            points: self.points.iter().map(|p| p.rotated(rotation)).collect(),
        }
    }

    /// Drops consecutive identical points, including a last point equal to
    /// the first. At least one point is always kept.
    pub fn dedup_consecutive(&self) -> Polygon {
        let mut points = self.points.clone();
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Polygon { points }
    }
}

impl AsRef<[Point2D]> for Polygon {
    fn as_ref(&self) -> &[Point2D] {
        &self.points
    }
}
