//! Point-in-loop tests and the surrounding-loop forest.
//!
//! Containment uses the crossing-parity rule: a point is inside when an
//! odd number of loop edges cross the horizontal line through it strictly
//! to its left. Nesting of whole loops is decided from the inner loop's
//! leftmost point, which can only touch the outer loop if the two overlap.

use crate::scanline::x_intersection_if_exists;
use layerkit_core::{GeometryError, Point2D, Polygon, Result};
use std::collections::VecDeque;
use tracing::debug;

/// Number of edges of `polygon` crossing the line through `point` strictly
/// left of it.
pub fn crossings_to_left(polygon: &Polygon, point: Point2D) -> usize {
    polygon
        .edges()
        .filter_map(|(a, b)| x_intersection_if_exists(a, b, point.y))
        .filter(|x| *x < point.x)
        .count()
}

pub fn is_point_inside_loop(polygon: &Polygon, point: Point2D) -> bool {
    crossings_to_left(polygon, point) % 2 == 1
}

/// Filled-region test: parity of the crossings of all candidate loops, so
/// a point inside a hole of an outline counts as outside.
pub fn is_inside(point: Point2D, candidate_loops: &[Polygon]) -> bool {
    let total: usize = candidate_loops
        .iter()
        .map(|polygon| crossings_to_left(polygon, point))
        .sum();
    total % 2 == 1
}

pub fn is_loop_inside_loop(outer: &Polygon, inner: &Polygon) -> bool {
    is_point_inside_loop(outer, inner.leftmost_point())
}

/// A boundary loop together with everything nested directly inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SurroundingLoop {
    pub boundary: Polygon,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Zero for roots; odd depths are holes.
    pub depth: usize,
    pub fill_paths: Vec<Vec<Point2D>>,
}

impl SurroundingLoop {
    fn new(boundary: Polygon) -> Self {
        Self {
            boundary,
            parent: None,
            children: Vec::new(),
            depth: 0,
            fill_paths: Vec::new(),
        }
    }
}

/// Containment forest of one layer's loops, stored as an arena.
///
/// Node indices match the order of the loops passed to
/// [`build_surrounding_tree`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurroundingForest {
    nodes: Vec<SurroundingLoop>,
    roots: Vec<usize>,
}

impl SurroundingForest {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn nodes(&self) -> &[SurroundingLoop] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&SurroundingLoop> {
        self.nodes.get(index)
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|node| node.parent)
    }

    pub fn children(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn depth(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).map(|node| node.depth)
    }

    pub fn is_hole(&self, index: usize) -> bool {
        self.depth(index).is_some_and(|depth| depth % 2 == 1)
    }

    /// Attaches a fill path to a node.
    pub fn add_fill_path(&mut self, index: usize, path: Vec<Point2D>) -> Result<()> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(index)
            .ok_or_else(|| GeometryError::InvalidParameter {
                name: "index".to_string(),
                reason: format!("node {} out of range for forest of {}", index, len),
            })?;
        node.fill_paths.push(path);
        Ok(())
    }

    /// Node indices level by level, roots first.
    pub fn breadth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<usize> = self.roots.iter().copied().collect();
        while let Some(index) = queue.pop_front() {
            order.push(index);
            queue.extend(self.nodes[index].children.iter().copied());
        }
        order
    }

    /// Order in which to emit loops starting from `start`.
    ///
    /// Each boundary comes before the loops nested in it; among siblings the
    /// one closest to the current position goes next. The position advances
    /// to the entry vertex of each emitted boundary, or to the end of its
    /// last fill path.
    pub fn emission_order(&self, start: Point2D) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut position = start;
        let mut stack: Vec<Vec<usize>> = vec![self.roots.clone()];

        while let Some(group) = stack.last_mut() {
            let nearest = group
                .iter()
                .enumerate()
                .map(|(slot, &index)| (slot, nearest_vertex(&self.nodes[index].boundary, position)))
                .min_by(|a, b| {
                    a.1.distance_squared_to(position)
                        .total_cmp(&b.1.distance_squared_to(position))
                });
            let Some((slot, entry)) = nearest else {
                stack.pop();
                continue;
            };
            let index = group.remove(slot);
            order.push(index);

            let node = &self.nodes[index];
            position = node
                .fill_paths
                .last()
                .and_then(|path| path.last().copied())
                .unwrap_or(entry);
            if !node.children.is_empty() {
                stack.push(node.children.clone());
            }
        }
        order
    }

    /// Releases the boundaries in node order.
    pub fn into_loops(self) -> Vec<Polygon> {
        self.nodes.into_iter().map(|node| node.boundary).collect()
    }
}

fn nearest_vertex(polygon: &Polygon, position: Point2D) -> Point2D {
    polygon
        .points()
        .iter()
        .copied()
        .min_by(|a, b| {
            a.distance_squared_to(position)
                .total_cmp(&b.distance_squared_to(position))
        })
        .unwrap_or(position)
}

/// Builds the containment forest of `loops`.
///
/// Every loop is tested against every other. A loop may only contain loops
/// of strictly smaller area (or equal area and higher index), which keeps the
/// parent relation acyclic even for coincident input. Each contained loop is
/// attached to its innermost container, found by re-testing the collected
/// containers against the current best.
pub fn build_surrounding_tree(loops: Vec<Polygon>) -> SurroundingForest {
    let areas: Vec<f64> = loops.iter().map(Polygon::area).collect();
    let may_contain = |outer: usize, inner: usize| {
        areas[outer] > areas[inner] || (areas[outer] == areas[inner] && outer < inner)
    };

    let mut parents = vec![None; loops.len()];
    for inner in 0..loops.len() {
        let containers: Vec<usize> = (0..loops.len())
            .filter(|&outer| {
                outer != inner
                    && may_contain(outer, inner)
                    && is_loop_inside_loop(&loops[outer], &loops[inner])
            })
            .collect();
        let Some((&first, rest)) = containers.split_first() else {
            continue;
        };
        let mut innermost = first;
        for &candidate in rest {
            if may_contain(innermost, candidate)
                && is_loop_inside_loop(&loops[innermost], &loops[candidate])
            {
                innermost = candidate;
            }
        }
        parents[inner] = Some(innermost);
    }

    let mut nodes: Vec<SurroundingLoop> = loops.into_iter().map(SurroundingLoop::new).collect();
    let mut roots = Vec::new();
    for (index, parent) in parents.iter().enumerate() {
        nodes[index].parent = *parent;
        match parent {
            Some(parent) => nodes[*parent].children.push(index),
            None => roots.push(index),
        }
    }

    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(index) = queue.pop_front() {
        let depth = nodes[index].depth + 1;
        for child in nodes[index].children.clone() {
            nodes[child].depth = depth;
            queue.push_back(child);
        }
    }

    debug!(loops = nodes.len(), roots = roots.len(), "built surrounding forest");
    SurroundingForest { nodes, roots }
}
