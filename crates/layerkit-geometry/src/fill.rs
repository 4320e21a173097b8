//! Parallel-line infill of solid regions.
//!
//! The loops are rotated so the fill direction lies along +x, swept with
//! horizontal scanlines, and each solid run is rotated back into a
//! [`FillSegment`]. The segments are disjoint and unordered as far as the
//! stitcher is concerned; alternate lines are reversed so that emitting
//! them as-is already zig-zags.

use crate::scanline::{BooleanRule, ScanlineSolidResolver};
use layerkit_core::{Bounds, GeometryError, Point2D, Polygon, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Infill tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    /// Distance between adjacent fill lines.
    pub line_spacing: f64,
    /// Direction of the fill lines, measured widdershins from +x.
    pub angle_degrees: f64,
    /// How the loop lists combine into the region being filled.
    pub rule: BooleanRule,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            line_spacing: 0.4,
            angle_degrees: 45.0,
            rule: BooleanRule::Union,
        }
    }
}

impl FillConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.line_spacing > 0.0 && self.line_spacing.is_finite()) {
            return Err(GeometryError::InvalidParameter {
                name: "line_spacing".to_string(),
                reason: format!("must be positive and finite, got {}", self.line_spacing),
            });
        }
        if !self.angle_degrees.is_finite() {
            return Err(GeometryError::InvalidParameter {
                name: "angle_degrees".to_string(),
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// One straight fill line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillSegment {
    pub start: Point2D,
    pub end: Point2D,
}

impl FillSegment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }
}

impl From<(Point2D, Point2D)> for FillSegment {
    fn from((start, end): (Point2D, Point2D)) -> Self {
        Self::new(start, end)
    }
}

#[derive(Debug, Clone)]
pub struct FillGenerator {
    config: FillConfig,
}

impl FillGenerator {
    pub fn new(config: FillConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Fill segments covering the region the configured rule selects from
    /// `loop_lists`.
    pub fn generate(&self, loop_lists: &[Vec<Polygon>]) -> Vec<FillSegment> {
        // Rotating by the negated angle brings the fill direction onto +x.
        let rotation = Point2D::from_angle(-self.config.angle_degrees.to_radians());
        let rotated_points = loop_lists
            .iter()
            .flatten()
            .flat_map(|polygon| polygon.points().iter())
            .map(|point| point.rotated(rotation));
        let Some(bounds) = Bounds::from_points(rotated_points) else {
            return Vec::new();
        };

        let resolver = ScanlineSolidResolver::new(loop_lists).with_rotation(rotation);
        let spacing = self.config.line_spacing;
        let mut segments = Vec::new();
        let mut line = 0usize;
        loop {
            let y = bounds.min_y + (line as f64 + 0.5) * spacing;
            if y >= bounds.max_y {
                break;
            }
            for (start, end) in resolver.solid_runs(y, self.config.rule) {
                let segment = FillSegment::new(
                    Point2D::new(start, y).unrotated(rotation),
                    Point2D::new(end, y).unrotated(rotation),
                );
                segments.push(if line % 2 == 1 {
                    segment.reversed()
                } else {
                    segment
                });
            }
            line += 1;
        }

        debug!(
            lines = line,
            segments = segments.len(),
            angle = self.config.angle_degrees,
            "generated fill"
        );
        segments
    }

    /// Convenience for a single boundary source (outline plus holes).
    pub fn generate_for_loops(&self, loops: &[Polygon]) -> Vec<FillSegment> {
        self.generate(&[loops.to_vec()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon {
        Polygon::rectangle(Point2D::new(min, min), Point2D::new(max, max))
    }

    fn horizontal(spacing: f64) -> FillGenerator {
        FillGenerator::new(FillConfig {
            line_spacing: spacing,
            angle_degrees: 0.0,
            rule: BooleanRule::Union,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_spacing() {
        let config = FillConfig {
            line_spacing: 0.0,
            ..FillConfig::default()
        };
        assert!(FillGenerator::new(config).is_err());
    }

    #[test]
    fn test_horizontal_fill_of_square() {
        let segments = horizontal(1.0).generate_for_loops(&[square(0.0, 10.0)]);
        assert_eq!(segments.len(), 10);
        for (line, segment) in segments.iter().enumerate() {
            let expected_y = line as f64 + 0.5;
            assert!((segment.start.y - expected_y).abs() < 1e-9);
            assert!((segment.end.y - expected_y).abs() < 1e-9);
            assert!((segment.length() - 10.0).abs() < 1e-9);
        }
        // Alternate lines run in opposite directions.
        assert!(segments[0].start.x < segments[0].end.x);
        assert!(segments[1].start.x > segments[1].end.x);
    }

    #[test]
    fn test_hole_splits_lines() {
        let loops = vec![square(0.0, 10.0), square(4.0, 6.0).reversed()];
        let segments = horizontal(1.0).generate_for_loops(&loops);
        // Lines at y = 4.5 and 5.5 cross the hole.
        assert_eq!(segments.len(), 12);
        for segment in &segments {
            let mid = segment.start.lerp(segment.end, 0.5);
            assert!(!(mid.x > 4.0 && mid.x < 6.0 && mid.y > 4.0 && mid.y < 6.0));
        }
    }

    #[test]
    fn test_angled_fill_stays_inside() {
        let generator = FillGenerator::new(FillConfig::default()).unwrap();
        let segments = generator.generate_for_loops(&[square(0.0, 10.0)]);
        assert!(!segments.is_empty());
        for segment in &segments {
            for p in [segment.start, segment.end] {
                assert!(p.x > -1e-9 && p.x < 10.0 + 1e-9);
                assert!(p.y > -1e-9 && p.y < 10.0 + 1e-9);
            }
            let direction = segment.start.direction_to(segment.end).unwrap();
            assert!((direction.x.abs() - direction.y.abs()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(horizontal(1.0).generate(&[]).is_empty());
    }
}
