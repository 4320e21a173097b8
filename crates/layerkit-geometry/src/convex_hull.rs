//! Gift-wrap convex hull.

use layerkit_core::Point2D;
use std::collections::HashSet;

const TIE_TOLERANCE: f64 = 1e-12;

fn unique_points(points: &[Point2D]) -> Vec<Point2D> {
    let mut seen = HashSet::with_capacity(points.len());
    points
        .iter()
        .copied()
        .filter(|p| seen.insert((p.x.to_bits(), p.y.to_bits())))
        .collect()
}

/// Convex hull of `points`, wound widdershins from the leftmost point.
///
/// Duplicates are removed first; fewer than three unique points are
/// returned unchanged. Each step keeps the remaining point whose direction
/// from the last hull point turns least from the previous hull edge,
/// starting from a straight-down reference. Among collinear candidates the
/// farther point wins, so collinear boundary points are dropped; input
/// lying on a single line yields just its two extreme points. Runs in
/// O(n²), which is fine for simplified, bounded inputs.
pub fn convex_hull(points: &[Point2D]) -> Vec<Point2D> {
    let mut remaining = unique_points(points);
    if remaining.len() < 3 {
        return remaining;
    }

    let leftmost_slot = remaining
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.x.total_cmp(&b.1.x).then(a.1.y.total_cmp(&b.1.y)))
        .map(|(slot, _)| slot)
        .unwrap_or(0);
    let leftmost = remaining.swap_remove(leftmost_slot);

    let mut hull = vec![leftmost];
    let mut last = leftmost;
    let mut reference = Point2D::new(0.0, -1.0);

    loop {
        let mut best_dot = f64::NEG_INFINITY;
        if hull.len() >= 2 {
            if let Ok(closing) = last.direction_to(leftmost) {
                best_dot = closing.dot(reference);
            }
        }

        let mut best: Option<(usize, Point2D, f64)> = None;
        for (slot, candidate) in remaining.iter().enumerate() {
            let Ok(direction) = last.direction_to(*candidate) else {
                continue;
            };
            let dot = direction.dot(reference);
            let distance = last.distance_squared_to(*candidate);
            let better = match best {
                None => dot > best_dot + TIE_TOLERANCE,
                Some((_, _, best_distance)) => {
                    dot > best_dot + TIE_TOLERANCE
                        || (dot >= best_dot - TIE_TOLERANCE && distance > best_distance)
                }
            };
            if better {
                best_dot = dot;
                best = Some((slot, direction, distance));
            }
        }

        let Some((slot, direction, _)) = best else {
            return hull;
        };
        last = remaining.swap_remove(slot);
        hull.push(last);
        reference = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerkit_core::Polygon;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2D> {
        coords.iter().copied().map(Point2D::from).collect()
    }

    #[test]
    fn test_hull_of_square_with_interior_point() {
        let hull = convex_hull(&pts(&[
            (0.0, 0.0),
            (10.0, 10.0),
            (5.0, 5.0),
            (10.0, 0.0),
            (0.0, 10.0),
        ]));
        assert_eq!(hull, pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
    }

    #[test]
    fn test_hull_is_widdershins() {
        let hull = convex_hull(&pts(&[(3.0, 1.0), (0.0, 0.0), (1.0, 4.0), (1.0, 1.0)]));
        let polygon = Polygon::new(hull).unwrap();
        assert!(polygon.is_widdershins());
        assert_eq!(polygon.len(), 3);
    }

    #[test]
    fn test_collinear_points_dropped() {
        let hull = convex_hull(&pts(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]));
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point2D::new(5.0, 0.0)));

        // A point on the closing edge is dropped too.
        let hull = convex_hull(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 5.0)]));
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&Point2D::new(0.0, 5.0)));
    }

    #[test]
    fn test_all_collinear_points_give_extremes() {
        assert_eq!(
            convex_hull(&pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])),
            pts(&[(0.0, 0.0), (2.0, 0.0)])
        );
        assert_eq!(
            convex_hull(&pts(&[(1.0, 1.0), (3.0, 3.0), (0.0, 0.0), (2.0, 2.0)])),
            pts(&[(0.0, 0.0), (3.0, 3.0)])
        );
    }

    #[test]
    fn test_small_inputs_returned_deduplicated() {
        let hull = convex_hull(&pts(&[(1.0, 1.0), (1.0, 1.0), (2.0, 2.0)]));
        assert_eq!(hull, pts(&[(1.0, 1.0), (2.0, 2.0)]));
        assert!(convex_hull(&[]).is_empty());
    }
}
