//! # LayerKit
//!
//! Planar geometry kernel for layer-based toolpath generation:
//! - Scanline boolean resolution of closed loops
//! - Loop nesting (outlines, holes, islands) as a surrounding-loop forest
//! - Convex hulls and channel-radius outline simplification
//! - Parallel-line infill stitched into collision-free continuous paths
//!
//! ## Architecture
//!
//! LayerKit is organized as a workspace with multiple crates:
//!
//! 1. **layerkit-core** - Point, polygon and bounds types, error handling
//! 2. **layerkit-geometry** - The kernel algorithms
//! 3. **layerkit-settings** - Kernel tunables and their persistence
//! 4. **layerkit** - This crate: the per-layer pipeline and the demo binary

pub use layerkit_core::{Bounds, GeometryError, Point2D, Polygon, EPSILON};
pub use layerkit_geometry::{
    build_surrounding_tree, convex_hull, is_inside, simplify_loop, BooleanRule, FillConfig,
    FillGenerator, FillSegment, PathStitcher, ScanlineSolidResolver, SimplifyConfig,
    StitchConfig, StitchOutcome, StitchStats, SurroundingForest,
};
pub use layerkit_settings::{KernelSettings, SettingsError};

use layerkit_geometry::is_point_inside_loop;
use tracing::{debug, info};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Toolpaths planned for one layer.
#[derive(Debug, Clone)]
pub struct LayerPlan {
    /// Simplified loops with their stitched fill paths attached.
    pub forest: SurroundingForest,
    /// Node indices in emission order.
    pub order: Vec<usize>,
    pub stats: StitchStats,
}

impl LayerPlan {
    pub fn fill_path_count(&self) -> usize {
        self.forest.nodes().iter().map(|node| node.fill_paths.len()).sum()
    }
}

/// Runs the full pipeline on one layer's loops: simplify, nest, fill,
/// stitch, then order the loops for emission starting from `start`.
pub fn plan_layer(
    loops: Vec<Polygon>,
    settings: &KernelSettings,
    start: Point2D,
) -> anyhow::Result<LayerPlan> {
    settings.validate()?;
    let simplified: Vec<Polygon> = loops
        .iter()
        .map(|polygon| simplify_loop(polygon, settings.simplify.radius))
        .collect();

    let segments = settings.fill_generator()?.generate_for_loops(&simplified);
    let outcome = settings.stitcher()?.stitch(&segments)?;

    let mut forest = build_surrounding_tree(simplified);
    for path in outcome.paths {
        if let Some(owner) = owning_loop(&forest, &path) {
            forest.add_fill_path(owner, path)?;
        }
    }
    let order = forest.emission_order(start);

    debug!(
        loops = forest.len(),
        segments = segments.len(),
        "planned layer"
    );
    Ok(LayerPlan {
        forest,
        order,
        stats: outcome.stats,
    })
}

/// Deepest loop containing the middle of the path's first segment.
fn owning_loop(forest: &SurroundingForest, path: &[Point2D]) -> Option<usize> {
    let probe = match path {
        [first, second, ..] => first.lerp(*second, 0.5),
        [only] => *only,
        [] => return None,
    };
    forest
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| is_point_inside_loop(&node.boundary, probe))
        .max_by_key(|(_, node)| node.depth)
        .map(|(index, _)| index)
        .or_else(|| forest.roots().first().copied())
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    info!(version = VERSION, build_date = BUILD_DATE, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Polygon {
        Polygon::rectangle(Point2D::new(min, min), Point2D::new(max, max))
    }

    #[test]
    fn test_plan_square_with_hole() {
        let loops = vec![square(0.0, 10.0), square(4.0, 6.0).reversed()];
        let plan = plan_layer(loops, &KernelSettings::default(), Point2D::new(-1.0, -1.0)).unwrap();

        assert_eq!(plan.order, vec![0, 1]);
        assert!(plan.forest.is_hole(1));
        assert!(plan.fill_path_count() >= 1);
        assert_eq!(plan.fill_path_count(), plan.stats.paths);
        assert!(plan.forest.get(1).unwrap().fill_paths.is_empty());
    }

    #[test]
    fn test_plan_rejects_invalid_settings() {
        let mut settings = KernelSettings::default();
        settings.fill.line_spacing = -1.0;
        assert!(plan_layer(vec![square(0.0, 1.0)], &settings, Point2D::default()).is_err());
    }

    #[test]
    fn test_plan_with_settings_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.toml");
        std::fs::write(&path, "[fill]\nline_spacing = 1.0\nangle_degrees = 0.0\n").unwrap();

        let settings = KernelSettings::load(&path).unwrap();
        let plan = plan_layer(vec![square(0.0, 10.0)], &settings, Point2D::default()).unwrap();

        // Ten horizontal lines, each either opening a path or joined to one.
        let stats = plan.stats;
        assert_eq!(stats.paths + stats.connectors + stats.coincident_joins, 10);
        assert_eq!(plan.fill_path_count(), stats.paths);
    }

    #[test]
    fn test_plan_empty_layer() {
        let plan = plan_layer(Vec::new(), &KernelSettings::default(), Point2D::default()).unwrap();
        assert!(plan.order.is_empty());
        assert_eq!(plan.stats.paths, 0);
    }
}
