//! # LayerKit Core
//!
//! Core value types and error handling for LayerKit.
//! Provides the 2D point, closed polygon and bounding-box types every
//! geometry stage is written against, plus the kernel's error type.

pub mod bounds;
pub mod error;
pub mod point;
pub mod polygon;

pub use bounds::Bounds;
pub use error::{GeometryError, Result};
pub use point::Point2D;
pub use polygon::Polygon;

/// Coordinates closer than this are treated as the same location.
pub const EPSILON: f64 = 1e-9;
