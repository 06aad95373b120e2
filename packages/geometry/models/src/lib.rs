#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic value types for hazard boundaries.
//!
//! Two families of types live here:
//!
//! - The canonical forms ([`Point`], [`Polygon`], [`BoundarySet`],
//!   [`BoundingBox`]) that every consumer works with.
//! - The raw decode forms ([`BoundaryInput`], [`PointInput`],
//!   [`Coordinate`]) that capture the loosely-typed encodings found in
//!   extraction documents and catalog records. Decoding is a single serde
//!   step; turning a decoded input into canonical polygons (and rejecting
//!   under-specified ones) is the geometry engine's job.

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees (WGS84 assumed, not enforced).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Point {
    /// Creates a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An ordered ring of points.
///
/// Closure (last point repeating the first) is optional here; see
/// [`Polygon::closed`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    /// Returns the vertices in order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Number of vertices, counting a closing vertex if present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ring has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the last vertex repeats the first.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) => self.0.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Returns a copy of this ring with the first vertex repeated at the
    /// end, unless it is already closed.
    #[must_use]
    pub fn closed(&self) -> Self {
        let mut points = self.0.clone();
        if !self.is_closed()
            && let Some(first) = points.first().copied()
        {
            points.push(first);
        }
        Self(points)
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// Zero or more polygons describing one or more disjoint areas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundarySet(pub Vec<Polygon>);

impl BoundarySet {
    /// An empty set (no boundary).
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns the member polygons.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    /// Whether the set holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with every ring closed.
    #[must_use]
    pub fn closed(&self) -> Self {
        Self(self.0.iter().map(Polygon::closed).collect())
    }
}

impl From<Polygon> for BoundarySet {
    fn from(polygon: Polygon) -> Self {
        Self(vec![polygon])
    }
}

/// Axis-aligned bounding box described by its northeast and southwest
/// corners, as exposed by place-search providers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Northeast (max latitude, max longitude) corner.
    pub northeast: Point,
    /// Southwest (min latitude, min longitude) corner.
    pub southwest: Point,
}

// ── Raw decode forms ────────────────────────────────────────────────

/// A single coordinate value as found in loosely-typed JSON: either a
/// number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    /// A JSON number.
    Number(f64),
    /// A JSON string expected to hold a number.
    Text(String),
}

impl Coordinate {
    /// Returns the numeric value, or `None` for non-numeric text and
    /// non-finite values (`"NaN"`, `"inf"`).
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }
}

/// A point-like value: a two-element `[latitude, longitude]` pair or an
/// object with latitude/longitude keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PointInput {
    /// `[latitude, longitude]`.
    Pair(Coordinate, Coordinate),
    /// `{"latitude": .., "longitude": ..}` (also `lat` / `lng` / `lon`).
    Object {
        /// Latitude value.
        #[serde(alias = "lat")]
        latitude: Coordinate,
        /// Longitude value.
        #[serde(alias = "lng", alias = "lon")]
        longitude: Coordinate,
    },
}

/// Coordinates of one GeoJSON-like polygon member.
///
/// Proper GeoJSON nests rings inside the polygon; a flat point list is
/// tolerated and treated as the single ring.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PolygonCoordinates {
    /// A flat point list used directly as the ring.
    Ring(Vec<PointInput>),
    /// A list of rings; only the first (exterior) ring is used.
    Rings(Vec<Vec<PointInput>>),
}

/// A GeoJSON-like geometry object, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonBoundary {
    /// A single polygon.
    Polygon {
        /// Ring coordinates.
        coordinates: PolygonCoordinates,
    },
    /// Several polygons.
    MultiPolygon {
        /// One entry per member polygon.
        coordinates: Vec<PolygonCoordinates>,
    },
}

/// Every accepted boundary encoding, decoded in one step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BoundaryInput {
    /// A GeoJSON-like `Polygon` / `MultiPolygon` object.
    GeoJson(GeoJsonBoundary),
    /// A flat list of point-like values forming one polygon.
    Polygon(Vec<PointInput>),
    /// A list of point lists, one per polygon.
    Polygons(Vec<Vec<PointInput>>),
}

impl BoundaryInput {
    /// Decodes a raw JSON value into one of the accepted encodings.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the value matches none of the shapes.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}
