use layerkit::{init_logging, plan_layer, KernelSettings, Point2D, Polygon};
use std::path::PathBuf;
use tracing::info;

/// Demo layer: a 40 × 30 plate with a round hole and a square island
/// inside the hole.
fn demo_layer() -> anyhow::Result<Vec<Polygon>> {
    let plate = Polygon::rectangle(Point2D::new(0.0, 0.0), Point2D::new(40.0, 30.0));
    let hole_points = (0..96)
        .map(|i| {
            let angle = -(i as f64) * std::f64::consts::TAU / 96.0;
            Point2D::new(20.0, 15.0) + Point2D::from_angle(angle) * 10.0
        })
        .collect();
    let hole = Polygon::new(hole_points)?;
    let island = Polygon::rectangle(Point2D::new(17.0, 12.0), Point2D::new(23.0, 18.0));
    Ok(vec![plate, hole, island])
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => KernelSettings::load(&path)?,
        None => KernelSettings::default(),
    };

    let plan = plan_layer(demo_layer()?, &settings, Point2D::new(0.0, 0.0))?;
    info!(
        loops = plan.forest.len(),
        fill_paths = plan.fill_path_count(),
        connectors = plan.stats.connectors,
        hops = plan.stats.hops,
        collisions = plan.stats.collision_rejections,
        fallback_scans = plan.stats.fallback_scans,
        order = ?plan.order,
        "layer planned"
    );
    Ok(())
}
