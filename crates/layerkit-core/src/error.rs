//! Error handling for LayerKit
//!
//! Geometric degeneracies are reported through [`GeometryError`] but are
//! rarely fatal: most kernel operations match on the error, log a
//! diagnostic and take a fallback branch (skip the edge, start a new path,
//! return the input unchanged). Only contractually invalid input such as an
//! empty polygon is surfaced to the caller.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry kernel error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A direction was required from a zero-length edge or segment
    #[error("Degenerate geometry: {context}")]
    DegenerateGeometry {
        /// What the direction was needed for.
        context: String,
    },

    /// The path stitcher found no eligible partner endpoint
    #[error("No eligible candidate found near ({x:.3}, {y:.3})")]
    NoCandidateFound {
        /// X coordinate of the endpoint being extended.
        x: f64,
        /// Y coordinate of the endpoint being extended.
        y: f64,
    },

    /// A polygon has fewer points than the operation requires
    #[error("Malformed polygon: {required} points required, {actual} given")]
    MalformedPolygon {
        /// Minimum number of points the operation needs.
        required: usize,
        /// Number of points supplied.
        actual: usize,
    },

    /// A polygon was constructed from an empty point list
    #[error("Polygon must contain at least one point")]
    EmptyPolygon,

    /// A numeric parameter is outside its valid domain
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl GeometryError {
    /// Shorthand for a [`GeometryError::DegenerateGeometry`].
    pub fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            context: context.into(),
        }
    }

    /// Returns true for errors the kernel recovers from on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateGeometry { .. }
                | Self::NoCandidateFound { .. }
                | Self::MalformedPolygon { .. }
        )
    }
}

/// Result type alias for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;
