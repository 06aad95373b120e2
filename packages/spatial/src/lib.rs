#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for hazard presentations.
//!
//! Each presentation is stored in an R-tree by the bounding box of its
//! circle and boundary polygons. A point lookup returns the presentations
//! whose box contains the point; callers then run the exact circle and
//! polygon tests from `elk_geometry` on that short list.
//!
//! Coordinates are stored as `[longitude, latitude]`. Boxes that would
//! cross the antimeridian are widened to the full longitude range.

use elk_geometry::{BoundarySet, EARTH_RADIUS_METERS, Point};
use geo::BoundingRect;
use rstar::{AABB, RTree, RTreeObject};

/// Relative padding added to circle boxes so vertices of generated circle
/// polygons never fall outside them.
const CIRCLE_MARGIN: f64 = 1e-6;

/// A presentation envelope stored in the R-tree.
#[derive(Debug, Clone)]
struct IndexEntry {
    id: u64,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// R-tree of presentation bounding boxes keyed by presentation id.
#[derive(Debug, Default)]
pub struct PresentationIndex {
    tree: RTree<IndexEntry>,
}

impl PresentationIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a presentation envelope.
    pub fn insert(&mut self, id: u64, envelope: AABB<[f64; 2]>) {
        self.tree.insert(IndexEntry { id, envelope });
    }

    /// Removes every envelope stored for `id`.
    pub fn remove(&mut self, id: u64) {
        let stale: Vec<IndexEntry> = self.tree.iter().filter(|e| e.id == id).cloned().collect();
        for entry in &stale {
            self.tree.remove(entry);
        }
    }

    /// Number of stored envelopes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Ids of presentations whose box contains `point`, ascending.
    #[must_use]
    pub fn candidates(&self, point: Point) -> Vec<u64> {
        let query_env = AABB::from_point([point.longitude, point.latitude]);
        let mut ids: Vec<u64> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| entry.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Bounding box of every vertex in `boundary`, or `None` when empty.
#[must_use]
pub fn boundary_envelope(boundary: &BoundarySet) -> Option<AABB<[f64; 2]>> {
    let points: Vec<geo::Point<f64>> = boundary
        .polygons()
        .iter()
        .flat_map(|polygon| polygon.points().iter())
        .map(|p| geo::Point::new(p.longitude, p.latitude))
        .collect();

    geo::MultiPoint::new(points)
        .bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

/// Bounding box of a great-circle disc, or `None` for a non-positive
/// radius.
#[must_use]
pub fn circle_envelope(center: Point, radius_meters: f64) -> Option<AABB<[f64; 2]>> {
    if radius_meters.is_nan() || radius_meters <= 0.0 {
        return None;
    }

    let angular = radius_meters / EARTH_RADIUS_METERS * (1.0 + CIRCLE_MARGIN);
    let lat_delta = angular.to_degrees();
    let min_lat = (center.latitude - lat_delta).max(-90.0);
    let max_lat = (center.latitude + lat_delta).min(90.0);

    let cos_lat = center.latitude.to_radians().cos();
    let (min_lng, max_lng) = if angular.sin() >= cos_lat || min_lat <= -90.0 || max_lat >= 90.0 {
        (-180.0, 180.0)
    } else {
        let lng_delta = (angular.sin() / cos_lat).asin().to_degrees();
        let (lo, hi) = (center.longitude - lng_delta, center.longitude + lng_delta);
        if lo < -180.0 || hi > 180.0 {
            (-180.0, 180.0)
        } else {
            (lo, hi)
        }
    };

    Some(AABB::from_corners([min_lng, min_lat], [max_lng, max_lat]))
}

/// Smallest box covering both inputs.
#[must_use]
pub fn merge_envelopes(a: AABB<[f64; 2]>, b: AABB<[f64; 2]>) -> AABB<[f64; 2]> {
    let (a_lo, a_hi) = (a.lower(), a.upper());
    let (b_lo, b_hi) = (b.lower(), b.upper());
    AABB::from_corners(
        [a_lo[0].min(b_lo[0]), a_lo[1].min(b_lo[1])],
        [a_hi[0].max(b_hi[0]), a_hi[1].max(b_hi[1])],
    )
}
