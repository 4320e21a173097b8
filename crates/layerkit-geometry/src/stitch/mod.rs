//! Greedy stitching of disjoint fill segments into continuous paths.
//!
//! Starting from the first segment, the stitcher repeatedly picks the
//! nearest segment end it can reach with a straight connector and appends
//! that segment. A connector is only made when its rasterized cells avoid
//! every input segment and every connector already emitted. Inside the
//! cells of its own two ends, where it necessarily meets the segments it
//! joins, it is instead tested exactly against the geometry there. When no
//! end is reachable the path is closed and a new one starts at the nearest
//! remaining end.

mod raster;
mod segment;

pub use raster::rasterize_segment;
pub use segment::{Endpoint, EndpointId};

use crate::fill::FillSegment;
use crate::spatial_grid::{cell_key, SpatialHashGrid};
use layerkit_core::{GeometryError, Point2D, Result, EPSILON};
use segment::SegmentArena;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Stitcher tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Cell width of the occupancy raster used for collision checks.
    pub resolution: f64,
    /// Sideways displacement of hop points.
    pub fill_inset: f64,
    /// Cell width of the endpoint grid; ends within this distance are
    /// always seen by the local search.
    pub search_radius: f64,
    /// Most local candidates examined before falling back.
    pub candidate_cap: usize,
    /// Candidates whose direction is closer than this to reversing along
    /// the segment just drawn are rejected.
    pub doubling_back_dot: f64,
    /// Connectors meeting the next segment at a sharper reversal than this
    /// go through a hop point.
    pub hop_dot: f64,
    /// Scan every remaining end when the local search finds nothing.
    pub fallback_scan: bool,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            resolution: 0.4,
            fill_inset: 0.2,
            search_radius: 1.2,
            candidate_cap: 15,
            doubling_back_dot: 0.9,
            hop_dot: 0.9,
            fallback_scan: true,
        }
    }
}

fn invalid(name: &str, reason: String) -> GeometryError {
    GeometryError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}

impl StitchConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("resolution", self.resolution),
            ("search_radius", self.search_radius),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(invalid(name, format!("must be positive and finite, got {}", value)));
            }
        }
        if !(self.fill_inset >= 0.0 && self.fill_inset.is_finite()) {
            return Err(invalid(
                "fill_inset",
                format!("must be non-negative and finite, got {}", self.fill_inset),
            ));
        }
        if self.candidate_cap == 0 {
            return Err(invalid("candidate_cap", "must be at least 1".to_string()));
        }
        for (name, value) in [
            ("doubling_back_dot", self.doubling_back_dot),
            ("hop_dot", self.hop_dot),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(invalid(name, format!("must lie in [-1, 1], got {}", value)));
            }
        }
        Ok(())
    }
}

/// Counters describing one stitching run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchStats {
    pub paths: usize,
    pub connectors: usize,
    pub hops: usize,
    pub coincident_joins: usize,
    pub collision_rejections: usize,
    pub doubling_back_rejections: usize,
    pub fallback_scans: usize,
    pub degenerate_segments: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchOutcome {
    /// Continuous polylines covering every usable input segment.
    pub paths: Vec<Vec<Point2D>>,
    /// Each connector as drawn, from the end it leaves to the end it
    /// reaches, including its hop point when it has one.
    pub connectors: Vec<Vec<Point2D>>,
    /// Path index of every input segment; `None` for degenerate segments.
    pub segment_paths: Vec<Option<usize>>,
    pub stats: StitchStats,
}

/// True when `a`–`b` and `c`–`d` cross at a single point interior to both.
/// Touching at an end or running collinear does not count.
fn segments_cross(a: Point2D, b: Point2D, c: Point2D, d: Point2D) -> bool {
    let side = |p: Point2D, q: Point2D, r: Point2D| (q - p).cross(r - p);
    side(a, b, c) * side(a, b, d) < 0.0 && side(c, d, a) * side(c, d, b) < 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupant {
    Segment(usize),
    Connector(usize),
}

/// An accepted partner for the current path end.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    target: EndpointId,
    hop: Option<Point2D>,
    coincident: bool,
}

#[derive(Debug, Clone)]
pub struct PathStitcher {
    config: StitchConfig,
}

impl PathStitcher {
    pub fn new(config: StitchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Joins `segments` into paths. Every non-degenerate segment appears in
    /// exactly one path, traversed in one direction or the other.
    pub fn stitch(&self, segments: &[FillSegment]) -> Result<StitchOutcome> {
        let mut run = StitchRun::new(&self.config, segments)?;
        run.run();
        Ok(run.finish())
    }
}

struct StitchRun<'c> {
    config: &'c StitchConfig,
    arena: SegmentArena,
    occupancy: SpatialHashGrid<Occupant>,
    endpoints: SpatialHashGrid<EndpointId>,
    paths: Vec<Vec<Point2D>>,
    connectors: Vec<Vec<Point2D>>,
    stats: StitchStats,
}

impl<'c> StitchRun<'c> {
    fn new(config: &'c StitchConfig, segments: &[FillSegment]) -> Result<Self> {
        let mut run = Self {
            config,
            arena: SegmentArena::new(segments),
            occupancy: SpatialHashGrid::new(config.resolution)?,
            endpoints: SpatialHashGrid::new(config.search_radius)?,
            paths: Vec::new(),
            connectors: Vec::new(),
            stats: StitchStats::default(),
        };

        for (index, segment) in segments.iter().enumerate() {
            let usable = segment.start.is_finite()
                && segment.end.is_finite()
                && segment.length() > EPSILON;
            if !usable {
                trace!(index, "skipping degenerate segment");
                run.arena.discard(index);
                run.stats.degenerate_segments += 1;
                continue;
            }
            for cell in rasterize_segment(segment.start, segment.end, config.resolution) {
                run.occupancy.insert_at(Occupant::Segment(index), cell);
            }
            for side in 0..2 {
                let id = EndpointId::new(index, side);
                run.endpoints.insert(id, run.arena.point(id));
            }
        }
        Ok(run)
    }

    fn run(&mut self) {
        let Some(mut tail) = self.start_first_path() else {
            return;
        };
        while self.arena.remaining() > 0 {
            match self.find_partner(tail) {
                Ok(candidate) => tail = self.extend(tail, candidate),
                Err(err) => {
                    trace!(%err, "closing path");
                    let here = self.arena.point(tail);
                    let Some(next) = self.nearest_live(here, None) else {
                        break;
                    };
                    tail = self.start_path(next);
                }
            }
        }
    }

    fn finish(self) -> StitchOutcome {
        let mut stats = self.stats;
        stats.paths = self.paths.len();
        debug!(
            paths = stats.paths,
            connectors = stats.connectors,
            hops = stats.hops,
            coincident = stats.coincident_joins,
            collisions = stats.collision_rejections,
            doubling_back = stats.doubling_back_rejections,
            fallback_scans = stats.fallback_scans,
            "stitched fill segments"
        );
        StitchOutcome {
            paths: self.paths,
            connectors: self.connectors,
            segment_paths: self.arena.segment_paths(),
            stats,
        }
    }

    /// Starts at the first usable segment, oriented so that it ends at the
    /// side nearer to some other segment.
    fn start_first_path(&mut self) -> Option<EndpointId> {
        let segment = (0..self.arena.len()).find(|&index| self.arena.is_live(index))?;
        let distance_from = |run: &Self, id: EndpointId| {
            run.nearest_live(run.arena.point(id), Some(segment))
                .map(|other| run.arena.point(id).distance_squared_to(run.arena.point(other)))
                .unwrap_or(f64::INFINITY)
        };
        let start = EndpointId::new(segment, 0);
        let end = start.sibling();
        let begin_at = if distance_from(self, start) < distance_from(self, end) {
            end
        } else {
            start
        };
        Some(self.start_path(begin_at))
    }

    /// Opens a new path entering the segment at `entry`; returns the far end.
    fn start_path(&mut self, entry: EndpointId) -> EndpointId {
        let exit = entry.sibling();
        self.paths
            .push(vec![self.arena.point(entry), self.arena.point(exit)]);
        self.consume(entry.segment);
        exit
    }

    fn consume(&mut self, segment: usize) {
        let path = self.paths.len().saturating_sub(1);
        self.arena.consume(segment, path);
        for side in 0..2 {
            let id = EndpointId::new(segment, side);
            self.endpoints.remove(&id, self.arena.point(id));
        }
    }

    /// Live end closest to `point`, ties broken by id; ends of `excluded`
    /// are skipped.
    fn nearest_live(&self, point: Point2D, excluded: Option<usize>) -> Option<EndpointId> {
        self.arena
            .live_endpoints()
            .filter(|id| Some(id.segment) != excluded)
            .map(|id| (id, point.distance_squared_to(self.arena.point(id))))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    fn by_distance(&self, point: Point2D, ids: impl Iterator<Item = EndpointId>) -> Vec<EndpointId> {
        let mut ranked: Vec<(EndpointId, f64)> = ids
            .map(|id| (id, point.distance_squared_to(self.arena.point(id))))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    fn find_partner(&mut self, tail: EndpointId) -> Result<Candidate> {
        let here = self.arena.point(tail);
        let back = self
            .paths
            .last()
            .and_then(|path| path.len().checked_sub(2).map(|i| path[i]))
            .and_then(|previous| here.direction_to(previous).ok());

        let mut local = self.by_distance(here, self.endpoints.query_iter(here).copied());
        local.truncate(self.config.candidate_cap);
        if let Some(candidate) = self.first_eligible(here, back, &local) {
            return Ok(candidate);
        }

        if self.config.fallback_scan {
            self.stats.fallback_scans += 1;
            let checked: HashSet<EndpointId> = local.into_iter().collect();
            let rest = self.by_distance(
                here,
                self.arena.live_endpoints().filter(|id| !checked.contains(id)),
            );
            if let Some(candidate) = self.first_eligible(here, back, &rest) {
                return Ok(candidate);
            }
        }
        Err(GeometryError::NoCandidateFound {
            x: here.x,
            y: here.y,
        })
    }

    fn first_eligible(
        &mut self,
        here: Point2D,
        back: Option<Point2D>,
        ranked: &[EndpointId],
    ) -> Option<Candidate> {
        for &target in ranked {
            let there = self.arena.point(target);
            if here.distance_to(there) <= EPSILON {
                return Some(Candidate {
                    target,
                    hop: None,
                    coincident: true,
                });
            }
            let Ok(direction) = here.direction_to(there) else {
                continue;
            };
            if back.is_some_and(|back| direction.dot(back) > self.config.doubling_back_dot) {
                self.stats.doubling_back_rejections += 1;
                continue;
            }
            let hop = self.hop_point(here, target);
            let mut route: SmallVec<[Point2D; 3]> = smallvec![here];
            route.extend(hop);
            route.push(there);
            if let Some(blocker) = self.blocker(&route) {
                match blocker {
                    Occupant::Segment(segment) => trace!(segment, "connector blocked by segment"),
                    Occupant::Connector(connector) => {
                        trace!(connector, "connector blocked by connector")
                    }
                }
                self.stats.collision_rejections += 1;
                continue;
            }
            return Some(Candidate {
                target,
                hop,
                coincident: false,
            });
        }
        None
    }

    /// Hop point for a connector that would fold back onto the target
    /// segment, displaced sideways from the target end towards `here`.
    fn hop_point(&self, here: Point2D, target: EndpointId) -> Option<Point2D> {
        if self.config.fill_inset <= 0.0 {
            return None;
        }
        let there = self.arena.point(target);
        let beyond = self.arena.point(target.sibling());
        let (Ok(arrive), Ok(leave)) = (there.direction_to(here), there.direction_to(beyond)) else {
            return None;
        };
        if arrive.dot(leave) <= self.config.hop_dot {
            return None;
        }
        let mut offset = leave.perpendicular();
        if offset.dot(here - there) < 0.0 {
            offset = -offset;
        }
        Some(there + offset * self.config.fill_inset)
    }

    /// First occupant in the way of `route`. Any occupant of a cell the
    /// route passes through blocks it, except in the cells of the route's
    /// two ends, where only geometry the route properly crosses does.
    fn blocker(&self, route: &[Point2D]) -> Option<Occupant> {
        let (&first, &last) = (route.first()?, route.last()?);
        let width = self.config.resolution;
        let ends = [cell_key(first, width), cell_key(last, width)];
        route.windows(2).find_map(|leg| {
            rasterize_segment(leg[0], leg[1], width)
                .into_iter()
                .find_map(|cell| {
                    let mut occupants = self.occupancy.cell(cell).iter().copied();
                    if ends.contains(&cell) {
                        occupants.find(|&occupant| self.crosses(leg[0], leg[1], occupant))
                    } else {
                        occupants.next()
                    }
                })
        })
    }

    fn crosses(&self, a: Point2D, b: Point2D, occupant: Occupant) -> bool {
        match occupant {
            Occupant::Segment(segment) => segments_cross(
                a,
                b,
                self.arena.point(EndpointId::new(segment, 0)),
                self.arena.point(EndpointId::new(segment, 1)),
            ),
            Occupant::Connector(connector) => self.connectors.get(connector).is_some_and(|route| {
                route
                    .windows(2)
                    .any(|leg| segments_cross(a, b, leg[0], leg[1]))
            }),
        }
    }

    /// Appends the connector and the target segment; returns the new tail.
    fn extend(&mut self, tail: EndpointId, candidate: Candidate) -> EndpointId {
        let here = self.arena.point(tail);
        let there = self.arena.point(candidate.target);
        let exit = candidate.target.sibling();
        let beyond = self.arena.point(exit);

        if candidate.coincident {
            self.stats.coincident_joins += 1;
        } else {
            let mut route = vec![here];
            route.extend(candidate.hop);
            route.push(there);
            let connector = self.connectors.len();
            for leg in route.windows(2) {
                for cell in rasterize_segment(leg[0], leg[1], self.config.resolution) {
                    self.occupancy.insert_at(Occupant::Connector(connector), cell);
                }
            }
            self.stats.connectors += 1;
            if candidate.hop.is_some() {
                self.stats.hops += 1;
            }
            if let Some(path) = self.paths.last_mut() {
                path.extend_from_slice(&route[1..]);
            }
            self.connectors.push(route);
        }

        if let Some(path) = self.paths.last_mut() {
            path.push(beyond);
        }
        self.consume(candidate.target.segment);
        exit
    }
}
