//! Spatial hash grid for approximate proximity queries.
//!
//! Items are bucketed by the integer cell their point falls into. A
//! [`SpatialHashGrid::query`] returns everything in the 3×3 block of cells
//! around the query point: it never misses an item within one cell width,
//! but may return items up to two cell diagonals away, so callers re-check
//! exact distances.

use layerkit_core::{GeometryError, Point2D, Result};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Integer bucket coordinates of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub x: i64,
    pub y: i64,
}

impl CellKey {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// This cell and its eight neighbours, row by row.
    pub fn neighbourhood(&self) -> SmallVec<[CellKey; 9]> {
        let mut keys = SmallVec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                keys.push(CellKey::new(self.x + dx, self.y + dy));
            }
        }
        keys
    }
}

/// Bucket of `point` for a grid of the given cell width: each coordinate
/// divided by the width, floored.
pub fn cell_key(point: Point2D, cell_width: f64) -> CellKey {
    CellKey::new(
        (point.x / cell_width).floor() as i64,
        (point.y / cell_width).floor() as i64,
    )
}

/// Bucketed index mapping cells to the items registered there.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid<T> {
    cell_width: f64,
    cells: HashMap<CellKey, Vec<T>>,
    len: usize,
}

impl<T> SpatialHashGrid<T> {
    /// Creates an empty grid. The cell width must be positive and finite.
    pub fn new(cell_width: f64) -> Result<Self> {
        if !(cell_width > 0.0 && cell_width.is_finite()) {
            return Err(GeometryError::InvalidParameter {
                name: "cell_width".to_string(),
                reason: format!("must be positive and finite, got {}", cell_width),
            });
        }
        Ok(Self {
            cell_width,
            cells: HashMap::new(),
            len: 0,
        })
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn key_for(&self, point: Point2D) -> CellKey {
        cell_key(point, self.cell_width)
    }

    pub fn insert(&mut self, item: T, point: Point2D) {
        let key = self.key_for(point);
        self.insert_at(item, key);
    }

    /// Registers `item` directly in the bucket `key`.
    pub fn insert_at(&mut self, item: T, key: CellKey) {
        self.cells.entry(key).or_default().push(item);
        self.len += 1;
    }

    /// Items in the exact bucket of `point`.
    pub fn query_cell(&self, point: Point2D) -> &[T] {
        self.cell(self.key_for(point))
    }

    pub fn cell(&self, key: CellKey) -> &[T] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_occupied(&self, key: CellKey) -> bool {
        self.cells.get(&key).is_some_and(|items| !items.is_empty())
    }

    /// Iterates the items of the 3×3 neighbourhood around `point`.
    pub fn query_iter(&self, point: Point2D) -> impl Iterator<Item = &T> + '_ {
        self.key_for(point)
            .neighbourhood()
            .into_iter()
            .flat_map(move |key| self.cell(key).iter())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty buckets.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.cells.values().flatten()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

impl<T: Clone> SpatialHashGrid<T> {
    /// Union of the 3×3 block of buckets around `point`.
    pub fn query(&self, point: Point2D) -> Vec<T> {
        self.query_iter(point).cloned().collect()
    }
}

impl<T: PartialEq> SpatialHashGrid<T> {
    /// Removes one registration of `item` from the bucket of `point`.
    ///
    /// Cost is linear in the bucket size. Returns whether anything was removed.
    pub fn remove(&mut self, item: &T, point: Point2D) -> bool {
        let key = self.key_for(point);
        let Some(bucket) = self.cells.get_mut(&key) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|candidate| candidate == item) else {
            return false;
        };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.cells.remove(&key);
        }
        self.len -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_cell_width() {
        assert!(SpatialHashGrid::<usize>::new(0.0).is_err());
        assert!(SpatialHashGrid::<usize>::new(-1.0).is_err());
        assert!(SpatialHashGrid::<usize>::new(f64::NAN).is_err());
    }

    #[test]
    fn test_key_floors_negative_coordinates() {
        let grid = SpatialHashGrid::<usize>::new(2.0).unwrap();
        assert_eq!(grid.key_for(Point2D::new(3.9, 0.0)), CellKey::new(1, 0));
        assert_eq!(grid.key_for(Point2D::new(-0.1, -2.0)), CellKey::new(-1, -1));
    }

    #[test]
    fn test_query_covers_neighbourhood_only() {
        let mut grid = SpatialHashGrid::new(1.0).unwrap();
        grid.insert(1usize, Point2D::new(0.5, 0.5));
        grid.insert(2, Point2D::new(1.5, 1.5));
        grid.insert(3, Point2D::new(5.5, 5.5));

        let mut found = grid.query(Point2D::new(0.9, 0.9));
        found.sort();
        assert_eq!(found, vec![1, 2]);
        assert_eq!(grid.query_cell(Point2D::new(0.1, 0.1)), &[1]);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell_count(), 3);
    }

    #[test]
    fn test_remove_drops_empty_buckets() {
        let mut grid = SpatialHashGrid::new(1.0).unwrap();
        let p = Point2D::new(0.2, 0.2);
        grid.insert(7usize, p);
        grid.insert(8, p);

        assert!(grid.remove(&7, p));
        assert!(!grid.remove(&7, p));
        assert_eq!(grid.len(), 1);
        assert!(grid.remove(&8, p));
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
        assert!(!grid.is_occupied(grid.key_for(p)));
    }
}
