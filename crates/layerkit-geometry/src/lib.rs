//! # LayerKit Geometry
//!
//! Planar algorithms for turning one layer's closed loops into toolpaths:
//!
//! - [`spatial_grid`]: hash-bucketed proximity index
//! - [`scanline`]: crossing lists and solid runs under boolean rules
//! - [`containment`]: point-in-loop tests and the surrounding-loop forest
//! - [`convex_hull`]: gift-wrap hull
//! - [`simplify`]: channel-radius outline pruning
//! - [`fill`]: parallel-line infill segments
//! - [`stitch`]: greedy joining of fill segments into collision-free paths

pub mod containment;
pub mod convex_hull;
pub mod fill;
pub mod scanline;
pub mod simplify;
pub mod spatial_grid;
pub mod stitch;

pub use containment::{
    build_surrounding_tree, is_inside, is_loop_inside_loop, is_point_inside_loop,
    SurroundingForest, SurroundingLoop,
};
pub use convex_hull::convex_hull;
pub use fill::{FillConfig, FillGenerator, FillSegment};
pub use scanline::{
    solid_x_intersections, x_intersection_if_exists, x_intersections, BooleanRule,
    ScanlineSolidResolver, XIntersectionIndex,
};
pub use simplify::{simplify_loop, simplify_path, SimplifyConfig};
pub use spatial_grid::{CellKey, SpatialHashGrid};
pub use stitch::{
    rasterize_segment, EndpointId, PathStitcher, StitchConfig, StitchOutcome, StitchStats,
};
