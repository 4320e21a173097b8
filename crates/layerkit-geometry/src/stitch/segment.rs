//! Arena of fill segments whose endpoints know their sibling.

use crate::fill::FillSegment;
use layerkit_core::Point2D;

/// One end of a segment: `side` 0 is the segment's start, 1 its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId {
    pub segment: usize,
    pub side: u8,
}

impl EndpointId {
    pub const fn new(segment: usize, side: u8) -> Self {
        Self { segment, side }
    }

    /// The opposite end of the same segment.
    pub const fn sibling(&self) -> Self {
        Self::new(self.segment, self.side ^ 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub point: Point2D,
    /// Output path the endpoint was consumed into.
    pub path: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct SegmentArena {
    endpoints: Vec<[Endpoint; 2]>,
    live: Vec<bool>,
    remaining: usize,
}

impl SegmentArena {
    pub fn new(segments: &[FillSegment]) -> Self {
        let endpoints = segments
            .iter()
            .map(|segment| {
                [segment.start, segment.end].map(|point| Endpoint { point, path: None })
            })
            .collect();
        Self {
            endpoints,
            live: vec![true; segments.len()],
            remaining: segments.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn point(&self, id: EndpointId) -> Point2D {
        self.endpoints[id.segment][usize::from(id.side)].point
    }

    pub fn is_live(&self, segment: usize) -> bool {
        self.live[segment]
    }

    /// Marks both ends of `segment` as part of `path`.
    pub fn consume(&mut self, segment: usize, path: usize) {
        if !self.take(segment) {
            return;
        }
        for endpoint in &mut self.endpoints[segment] {
            endpoint.path = Some(path);
        }
    }

    /// Removes a segment from consideration without assigning it a path.
    pub fn discard(&mut self, segment: usize) {
        self.take(segment);
    }

    fn take(&mut self, segment: usize) -> bool {
        if !self.live[segment] {
            return false;
        }
        self.live[segment] = false;
        self.remaining -= 1;
        true
    }

    /// Endpoints of segments that have been neither consumed nor discarded.
    pub fn live_endpoints(&self) -> impl Iterator<Item = EndpointId> + '_ {
        (0..self.endpoints.len())
            .filter(move |&segment| self.live[segment])
            .flat_map(|segment| [EndpointId::new(segment, 0), EndpointId::new(segment, 1)])
    }

    /// Path each segment was consumed into.
    pub fn segment_paths(&self) -> Vec<Option<usize>> {
        self.endpoints.iter().map(|ends| ends[0].path).collect()
    }
}
