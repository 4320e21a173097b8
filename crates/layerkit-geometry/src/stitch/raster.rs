//! Cell rasterization of straight segments.

use crate::spatial_grid::{cell_key, CellKey};
use layerkit_core::Point2D;

/// Boundary crossings closer than this along the segment count as passing
/// through a cell corner.
const CORNER_TOLERANCE: f64 = 1e-9;

/// Parameter along the segment of the first cell boundary crossed on one
/// axis, and the parameter distance between successive crossings.
fn axis_crossings(from: f64, delta: f64, cell: i64, step: i64, width: f64) -> (f64, f64) {
    if step == 0 || delta == 0.0 {
        return (f64::INFINITY, f64::INFINITY);
    }
    let boundary = if step > 0 { cell + 1 } else { cell };
    ((boundary as f64 * width - from) / delta, width / delta.abs())
}

/// Every cell of a grid with the given width that the segment `a`–`b`
/// passes through, in order from `a` to `b`.
///
/// Cells are walked boundary by boundary. Where the segment passes through
/// a cell corner both cells beside the corner are included as well, so two
/// segments that cross always share at least one cell. The first and last
/// cells are exactly the cells of `a` and `b`. Non-finite input yields no
/// cells.
pub fn rasterize_segment(a: Point2D, b: Point2D, cell_width: f64) -> Vec<CellKey> {
    if !(a.is_finite() && b.is_finite() && cell_width > 0.0 && cell_width.is_finite()) {
        return Vec::new();
    }
    let first = cell_key(a, cell_width);
    let last = cell_key(b, cell_width);
    let (step_x, step_y) = ((last.x - first.x).signum(), (last.y - first.y).signum());
    let (mut left_x, mut left_y) = ((last.x - first.x).abs(), (last.y - first.y).abs());
    let (mut next_x, delta_x) = axis_crossings(a.x, b.x - a.x, first.x, step_x, cell_width);
    let (mut next_y, delta_y) = axis_crossings(a.y, b.y - a.y, first.y, step_y, cell_width);

    let mut cells = Vec::with_capacity((left_x + left_y + 1) as usize);
    cells.push(first);
    let (mut x, mut y) = (first.x, first.y);
    while left_x > 0 || left_y > 0 {
        let gap = next_x - next_y;
        if left_y == 0 || (left_x > 0 && gap < -CORNER_TOLERANCE) {
            x += step_x;
            next_x += delta_x;
            left_x -= 1;
        } else if left_x == 0 || gap > CORNER_TOLERANCE {
            y += step_y;
            next_y += delta_y;
            left_y -= 1;
        } else {
            cells.push(CellKey::new(x + step_x, y));
            cells.push(CellKey::new(x, y + step_y));
            x += step_x;
            y += step_y;
            next_x += delta_x;
            next_y += delta_y;
            left_x -= 1;
            left_y -= 1;
        }
        cells.push(CellKey::new(x, y));
    }
    cells
}
