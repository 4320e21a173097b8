//! Scanline solid resolver.
//!
//! Every boolean the kernel needs is answered one horizontal line at a
//! time: collect where each polygon edge crosses the line, sort the
//! crossings, then walk them left to right toggling the source polygon in
//! an open set. A region is solid while at least `k` sources are open, so a
//! single primitive covers union (`k = 1`), intersection (`k = N`) and the
//! "at least K layers thick" test used for solid infill.

use layerkit_core::{Point2D, Polygon, EPSILON};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::trace;

/// A scanline crossing tagged with the source that produced it.
///
/// Ordered by `x`, ties broken by `index`, so sorting is deterministic.
#[derive(Debug, Clone, Copy)]
pub struct XIntersectionIndex {
    pub index: usize,
    pub x: f64,
}

impl XIntersectionIndex {
    pub fn new(index: usize, x: f64) -> Self {
        Self { index, x }
    }
}

impl PartialEq for XIntersectionIndex {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for XIntersectionIndex {}

impl PartialOrd for XIntersectionIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XIntersectionIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Where the edge `begin`-`end` crosses the horizontal line `y`.
///
/// The edge counts when `min(y1, y2) <= y < max(y1, y2)`; the half-open
/// test keeps a vertex lying on the line from being counted twice.
/// Zero-height edges never cross.
pub fn x_intersection_if_exists(begin: Point2D, end: Point2D, y: f64) -> Option<f64> {
    if begin.y == end.y {
        return None;
    }
    let (low, high) = if begin.y < end.y {
        (begin, end)
    } else {
        (end, begin)
    };
    if y < low.y || y >= high.y {
        return None;
    }
    Some(low.x + (y - low.y) * (high.x - low.x) / (high.y - low.y))
}

fn is_sweepable(polygon: &Polygon) -> bool {
    if polygon.len() < 2 {
        trace!(points = polygon.len(), "excluding malformed loop from scanline");
        return false;
    }
    true
}

fn push_loop_crossings(points: &[Point2D], y: f64, mut push: impl FnMut(f64)) {
    let n = points.len();
    for i in 0..n {
        if let Some(x) = x_intersection_if_exists(points[i], points[(i + 1) % n], y) {
            push(x);
        }
    }
}

/// All crossing x values of `loops` with the line `y`, sorted ascending.
pub fn x_intersections(loops: &[Polygon], y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for polygon in loops.iter().filter(|p| is_sweepable(p)) {
        push_loop_crossings(polygon.points(), y, |x| xs.push(x));
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Like [`x_intersections`], but with every point first rotated by the unit
/// vector `rotation`. The returned x values are in the rotated frame.
pub fn x_intersections_rotated(loops: &[Polygon], rotation: Point2D, y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for polygon in loops.iter().filter(|p| is_sweepable(p)) {
        let rotated: Vec<Point2D> = polygon.points().iter().map(|p| p.rotated(rotation)).collect();
        push_loop_crossings(&rotated, y, |x| xs.push(x));
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Appends the crossings of `loops` with line `y`, all tagged `index`.
pub fn add_x_intersection_indexes(
    loops: &[Polygon],
    index: usize,
    y: f64,
    out: &mut Vec<XIntersectionIndex>,
) {
    for polygon in loops.iter().filter(|p| is_sweepable(p)) {
        push_loop_crossings(polygon.points(), y, |x| {
            out.push(XIntersectionIndex::new(index, x))
        });
    }
}

/// Crossings of every loop list with line `y`; each list's position is its
/// source index.
pub fn x_intersection_indexes_from_loop_lists(
    loop_lists: &[Vec<Polygon>],
    y: f64,
) -> Vec<XIntersectionIndex> {
    let mut out = Vec::new();
    for (index, loops) in loop_lists.iter().enumerate() {
        add_x_intersection_indexes(loops, index, y, &mut out);
    }
    out
}

fn toggle(open: &mut BTreeSet<usize>, index: usize) {
    if !open.remove(&index) {
        open.insert(index);
    }
}

fn sorted(list: &[XIntersectionIndex]) -> Vec<XIntersectionIndex> {
    let mut list = list.to_vec();
    list.sort();
    list
}

/// Boundaries of the region where at least `required_overlap_count`
/// sources are open.
///
/// An x is emitted every time solidity flips, so the result alternates
/// start/end. A count of zero behaves like one.
pub fn solid_x_intersections(
    list: &[XIntersectionIndex],
    required_overlap_count: usize,
) -> Vec<f64> {
    let required = required_overlap_count.max(1);
    let mut open = BTreeSet::new();
    let mut solid = false;
    let mut boundaries = Vec::new();
    for crossing in sorted(list) {
        toggle(&mut open, crossing.index);
        let was_solid = solid;
        solid = open.len() >= required;
        if was_solid != solid {
            boundaries.push(crossing.x);
        }
    }
    boundaries
}

/// Boundaries of the region inside source `fill_index` and outside every
/// other source.
pub fn difference_x_intersections(list: &[XIntersectionIndex], fill_index: usize) -> Vec<f64> {
    let mut open = BTreeSet::new();
    let mut fill = false;
    let mut solid = false;
    let mut boundaries = Vec::new();
    for crossing in sorted(list) {
        if crossing.index == fill_index {
            fill = !fill;
        } else {
            toggle(&mut open, crossing.index);
        }
        let was_solid = solid;
        solid = fill && open.is_empty();
        if was_solid != solid {
            boundaries.push(crossing.x);
        }
    }
    boundaries
}

/// Which sources must overlap for a scanline region to count as solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanRule {
    /// Inside any source.
    Union,
    /// Inside every source.
    Intersection,
    /// Inside at least this many sources.
    AtLeast(usize),
    /// Inside `fill_index` and outside all others.
    Difference { fill_index: usize },
}

impl Default for BooleanRule {
    fn default() -> Self {
        Self::Union
    }
}

/// Resolves solid runs of a set of loop lists along horizontal scanlines.
///
/// Each loop list is one boolean source (an outline together with its
/// holes, for example); its position in the slice is its source index.
#[derive(Debug, Clone)]
pub struct ScanlineSolidResolver<'a> {
    loop_lists: &'a [Vec<Polygon>],
    rotation: Option<Point2D>,
}

impl<'a> ScanlineSolidResolver<'a> {
    pub fn new(loop_lists: &'a [Vec<Polygon>]) -> Self {
        Self {
            loop_lists,
            rotation: None,
        }
    }

    /// Sweeps the loops rotated by the unit vector `rotation`.
    pub fn with_rotation(mut self, rotation: Point2D) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn source_count(&self) -> usize {
        self.loop_lists.len()
    }

    /// Tagged crossings of every source with line `y`.
    pub fn crossings(&self, y: f64) -> Vec<XIntersectionIndex> {
        let Some(rotation) = self.rotation else {
            return x_intersection_indexes_from_loop_lists(self.loop_lists, y);
        };
        let mut out = Vec::new();
        for (index, loops) in self.loop_lists.iter().enumerate() {
            out.extend(
                x_intersections_rotated(loops, rotation, y)
                    .into_iter()
                    .map(|x| XIntersectionIndex::new(index, x)),
            );
        }
        out
    }

    /// Solid boundaries along line `y` under `rule`.
    pub fn solid_boundaries(&self, y: f64, rule: BooleanRule) -> Vec<f64> {
        let crossings = self.crossings(y);
        match rule {
            BooleanRule::Union => solid_x_intersections(&crossings, 1),
            BooleanRule::Intersection => solid_x_intersections(&crossings, self.source_count()),
            BooleanRule::AtLeast(k) => solid_x_intersections(&crossings, k),
            BooleanRule::Difference { fill_index } => {
                difference_x_intersections(&crossings, fill_index)
            }
        }
    }

    /// Solid `(start, end)` runs along line `y`. Zero-width runs are dropped.
    pub fn solid_runs(&self, y: f64, rule: BooleanRule) -> Vec<(f64, f64)> {
        let boundaries = self.solid_boundaries(y, rule);
        boundaries
            .chunks_exact(2)
            .filter_map(|pair| {
                let (start, end) = (pair[0], pair[1]);
                if end - start <= EPSILON {
                    trace!(y, x = start, "skipping zero-width run");
                    return None;
                }
                Some((start, end))
            })
            .collect()
    }
}
