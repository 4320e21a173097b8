//! Property-based tests for the geometry kernel.
//!
//! Run with: cargo test -p layerkit-geometry -- proptest

use layerkit_core::{Point2D, Polygon};
use layerkit_geometry::{
    convex_hull, is_inside, is_point_inside_loop, simplify_loop, solid_x_intersections,
    x_intersections, FillConfig, FillGenerator, FillSegment, PathStitcher, SpatialHashGrid,
    StitchConfig, XIntersectionIndex,
};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point(extent: f64) -> impl Strategy<Value = Point2D> {
    (-extent..extent, -extent..extent).prop_map(|(x, y)| Point2D::new(x, y))
}

/// Star-shaped polygon around the origin: evenly spread angles, each vertex
/// at a random radius, wound widdershins.
fn arb_star_polygon() -> impl Strategy<Value = Polygon> {
    prop::collection::vec(1.0..10.0f64, 3..16).prop_map(|radii| {
        let n = radii.len();
        let points = radii
            .iter()
            .enumerate()
            .map(|(i, r)| Point2D::from_angle(i as f64 * std::f64::consts::TAU / n as f64) * *r)
            .collect();
        Polygon::new(points).unwrap()
    })
}

/// Randomly oriented segments scattered over a small area, so that many
/// of the candidate joins between them cross other segments.
fn arb_scattered_segments() -> impl Strategy<Value = Vec<FillSegment>> {
    prop::collection::vec((arb_point(6.0), arb_point(6.0)), 2..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter(|(a, b)| a.distance_to(*b) > 0.1)
            .map(|(a, b)| FillSegment::new(a, b))
            .collect()
    })
}

// =============================================================================
// Reference implementations
// =============================================================================

/// Orientation of `r` relative to the directed line `p`-`q`; values too
/// close to zero to decide are reported as collinear.
fn orientation(p: Point2D, q: Point2D, r: Point2D) -> i8 {
    let side = (q - p).cross(r - p);
    if side > 1e-9 {
        1
    } else if side < -1e-9 {
        -1
    } else {
        0
    }
}

/// Whether `a`-`b` and `c`-`d` clearly cross at a point interior to both.
fn properly_intersect(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> bool {
    orientation(a, b, c) * orientation(a, b, d) < 0 && orientation(c, d, a) * orientation(c, d, b) < 0
}

/// First connector leg that crosses an input segment or a leg of an
/// earlier connector, described for the failure message.
fn first_crossing(segments: &[FillSegment], connectors: &[Vec<Point2D>]) -> Option<(usize, String)> {
    for (index, connector) in connectors.iter().enumerate() {
        for leg in connector.windows(2) {
            if let Some(segment) = segments
                .iter()
                .position(|s| properly_intersect(leg[0], leg[1], s.start, s.end))
            {
                return Some((index, format!("segment {}", segment)));
            }
            for (earlier, route) in connectors[..index].iter().enumerate() {
                if route
                    .windows(2)
                    .any(|other| properly_intersect(leg[0], leg[1], other[0], other[1]))
                {
                    return Some((index, format!("connector {}", earlier)));
                }
            }
        }
    }
    None
}

/// Classic even-odd ray cast towards -x.
fn brute_force_inside(polygon: &Polygon, point: Point2D) -> bool {
    let mut inside = false;
    for (a, b) in polygon.edges() {
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x < point.x {
                inside = !inside;
            }
        }
    }
    inside
}

fn distance_to_segment(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.distance_to(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance_to(a.lerp(b, t))
}

fn far_from_boundary(polygon: &Polygon, point: Point2D) -> bool {
    polygon
        .edges()
        .all(|(a, b)| distance_to_segment(point, a, b) > 1e-6)
        && polygon.points().iter().all(|v| (v.y - point.y).abs() > 1e-9)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_point_in_loop_matches_ray_cast(
        polygon in arb_star_polygon(),
        point in arb_point(12.0),
    ) {
        prop_assume!(far_from_boundary(&polygon, point));
        let expected = brute_force_inside(&polygon, point);
        prop_assert_eq!(is_point_inside_loop(&polygon, point), expected);
        prop_assert_eq!(is_inside(point, std::slice::from_ref(&polygon)), expected);
    }

    #[test]
    fn proptest_grid_query_finds_all_near_items(
        points in prop::collection::vec(arb_point(20.0), 0..60),
        query in arb_point(20.0),
        width in 0.5..4.0f64,
    ) {
        let mut grid = SpatialHashGrid::new(width).unwrap();
        for (i, p) in points.iter().enumerate() {
            grid.insert(i, *p);
        }
        let found: HashSet<usize> = grid.query(query).into_iter().collect();
        for (i, p) in points.iter().enumerate() {
            if p.distance_to(query) < width * (1.0 - 1e-9) {
                prop_assert!(found.contains(&i), "missed item {} at {}", i, p);
            }
        }
    }

    #[test]
    fn proptest_single_source_solid_matches_raw_crossings(
        polygon in arb_star_polygon(),
        y in -10.0..10.0f64,
    ) {
        let loops = vec![polygon];
        let raw = x_intersections(&loops, y);
        let tagged: Vec<XIntersectionIndex> =
            raw.iter().map(|x| XIntersectionIndex::new(0, *x)).collect();
        prop_assert_eq!(solid_x_intersections(&tagged, 1), raw);
    }

    #[test]
    fn proptest_hull_contains_polygon(polygon in arb_star_polygon()) {
        let hull = convex_hull(polygon.points());
        for p in &hull {
            prop_assert!(polygon.points().contains(p));
        }
        let hull = Polygon::new(hull).unwrap();
        prop_assert!(hull.signed_area() > 0.0);
        prop_assert!(hull.area() >= polygon.area() - 1e-9);
    }

    #[test]
    fn proptest_zero_radius_simplify_is_identity(polygon in arb_star_polygon()) {
        prop_assert_eq!(simplify_loop(&polygon, 0.0), polygon);
    }

    #[test]
    fn proptest_stitched_fill_connectors_never_cross(
        polygon in arb_star_polygon(),
        angle in 0.0..180.0f64,
    ) {
        let fill = FillGenerator::new(FillConfig {
            angle_degrees: angle,
            ..FillConfig::default()
        })
        .unwrap();
        let segments = fill.generate_for_loops(std::slice::from_ref(&polygon));
        let outcome = PathStitcher::new(StitchConfig::default())
            .unwrap()
            .stitch(&segments)
            .unwrap();

        prop_assert!(outcome.segment_paths.iter().all(Option::is_some));
        let drawn: usize = outcome.paths.iter().map(Vec::len).sum();
        prop_assert!(drawn >= 2 * outcome.stats.paths);
        if let Some((connector, other)) = first_crossing(&segments, &outcome.connectors) {
            prop_assert!(false, "connector {} crosses {}", connector, other);
        }
    }

    #[test]
    fn proptest_stitched_diagonals_connectors_never_cross(
        segments in arb_scattered_segments(),
        resolution in 0.2..1.5f64,
    ) {
        let config = StitchConfig {
            resolution,
            ..StitchConfig::default()
        };
        let outcome = PathStitcher::new(config).unwrap().stitch(&segments).unwrap();

        prop_assert!(outcome.segment_paths.iter().all(Option::is_some));
        prop_assert!(outcome.stats.paths <= segments.len());
        if let Some((connector, other)) = first_crossing(&segments, &outcome.connectors) {
            prop_assert!(false, "connector {} crosses {}", connector, other);
        }
    }
}
