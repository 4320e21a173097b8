//! Channel-radius point pruning for loops and open paths.
//!
//! The channel radius sweeps up exponentially from a tiny fraction of the
//! target. Each sweep step runs two half passes that protect alternating
//! index parities, so no single pass can remove more than half the points
//! and every removal decision is made against neighbours that survive it.

use layerkit_core::{Point2D, Polygon};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The sweep starts at `radius / SWEEP_DIVISOR`.
const SWEEP_DIVISOR: f64 = 256.0;

/// Simplifier tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Target channel radius; zero disables simplification.
    pub radius: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self { radius: 0.05 }
    }
}

/// True when dropping `point` keeps the outline within `channel` of the
/// line joining its neighbours.
fn is_within_channel(channel: f64, behind: Point2D, point: Point2D, ahead: Point2D) -> bool {
    let behind_segment = behind - point;
    let behind_length = behind_segment.length();
    if behind_length < channel {
        return true;
    }
    let ahead_segment = ahead - point;
    let ahead_length = ahead_segment.length();
    if ahead_length < channel {
        return true;
    }
    let (Ok(behind_dir), Ok(ahead_dir)) = (behind_segment.normalized(), ahead_segment.normalized())
    else {
        return true;
    };
    // Zero when the three points are collinear, two at a full reversal.
    let deviation = 1.0 + ahead_dir.dot(behind_dir);
    behind_length * deviation < channel || ahead_length * deviation < channel
}

fn half_simplified(points: &[Point2D], channel: f64, remainder: usize, closed: bool) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let protected_last = if remainder == 1 { n - 1 } else { 0 };
    let mut kept = Vec::with_capacity(n);
    for (i, point) in points.iter().enumerate() {
        let is_end = !closed && (i == 0 || i == n - 1);
        if i % 2 == remainder || i == protected_last || is_end {
            kept.push(*point);
            continue;
        }
        let behind = points[(i + n - 1) % n];
        let ahead = points[(i + 1) % n];
        if !is_within_channel(channel, behind, *point, ahead) {
            kept.push(*point);
        }
    }
    kept
}

/// Drops every point closer than `radius` to the previously kept point.
/// Open paths keep their last point.
fn away_points(points: Vec<Point2D>, radius: f64, closed: bool) -> Vec<Point2D> {
    let Some((&first, rest)) = points.split_first() else {
        return points;
    };
    let mut kept = vec![first];
    for point in rest {
        if kept[kept.len() - 1].distance_to(*point) >= radius {
            kept.push(*point);
        }
    }
    if !closed && points.len() > 1 {
        let last = points[points.len() - 1];
        if kept[kept.len() - 1] != last {
            if kept.len() > 1 {
                kept.pop();
            }
            kept.push(last);
        }
    }
    kept
}

fn simplify_points(points: &[Point2D], radius: f64, closed: bool) -> Vec<Point2D> {
    if !(radius > 0.0 && radius.is_finite()) || points.len() < 2 {
        return points.to_vec();
    }
    let mut current = points.to_vec();
    let mut channel = radius / SWEEP_DIVISOR;
    let mut sweeps = 0usize;
    loop {
        let before = current.len();
        current = half_simplified(&current, channel, 0, closed);
        current = half_simplified(&current, channel, 1, closed);
        sweeps += 1;
        if current.len() < 3 || (channel >= radius && current.len() == before) {
            break;
        }
        channel = (channel * 2.0).min(radius);
    }
    let simplified = away_points(current, radius, closed);
    trace!(
        before = points.len(),
        after = simplified.len(),
        sweeps,
        "simplified outline"
    );
    simplified
}

/// Simplifies a closed loop. A radius of zero returns the loop unchanged.
pub fn simplify_loop(polygon: &Polygon, radius: f64) -> Polygon {
    let points = simplify_points(polygon.points(), radius, true);
    Polygon::new(points).unwrap_or_else(|_| polygon.clone())
}

/// Simplifies an open polyline; both ends are always kept.
pub fn simplify_path(path: &[Point2D], radius: f64) -> Vec<Point2D> {
    simplify_points(path, radius, false)
}
