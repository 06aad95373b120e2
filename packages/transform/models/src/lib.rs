#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Consolidated payload types.
//!
//! One [`TransformOutput`] is written per transformer run and later
//! ingested by the catalog. Optional fields are omitted from the JSON
//! rather than written as `null`.

use elk_catalog_models::{HazardCategory, LocationKind, Severity};
use elk_geometry_models::{BoundarySet, Point, Polygon};
use serde::{Deserialize, Serialize};

/// The full result of one consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformOutput {
    /// Locations sorted case-insensitively by name.
    pub locations: Vec<LocationPayload>,
    /// Hazards sorted case-insensitively by name.
    pub hazards: Vec<HazardPayload>,
}

/// A consolidated location with its hazard presentations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPayload {
    /// Catalog id, or a synthetic `new-location-<n>` id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Kind of area.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LocationKind>,
    /// Representative latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Representative longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// External geocoder place identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps_id: Option<String>,
    /// Location boundary with closed rings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryPayload>,
    /// Presentations at this location, sorted by hazard name.
    #[serde(default)]
    pub presentations: Vec<PresentationPayload>,
}

/// A consolidated hazard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardPayload {
    /// Catalog id, or a synthetic `new-hazard-<n>` id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Severity, when any source supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Category, when any source supplied one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<HazardCategory>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One hazard's presentation at the enclosing location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationPayload {
    /// Id of the presented hazard.
    pub hazard_id: String,
    /// Name of the presented hazard.
    pub hazard_name: String,
    /// Extent of the hazard at this location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryPayload>,
    /// Collected notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
    /// The hazard's severity, repeated for convenience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_severity: Option<Severity>,
    /// The hazard's category, repeated for convenience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_type: Option<HazardCategory>,
}

/// Presentation notes: a bare string when there is exactly one, otherwise
/// a sorted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notes {
    /// Exactly one note.
    Single(String),
    /// Several notes, sorted.
    Many(Vec<String>),
}

impl Notes {
    /// Builds the rendered form from an already-sorted list, or `None` if
    /// the list is empty.
    #[must_use]
    pub fn from_sorted(mut notes: Vec<String>) -> Option<Self> {
        match notes.len() {
            0 => None,
            1 => notes.pop().map(Self::Single),
            _ => Some(Self::Many(notes)),
        }
    }

    /// All notes as a list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(note) => vec![note.clone()],
            Self::Many(notes) => notes.clone(),
        }
    }
}

/// Rendered boundary: one closed ring as a flat point list, or several
/// closed rings as a list of point lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundaryPayload {
    /// A single polygon.
    Polygon(Vec<Point>),
    /// Several polygons.
    Polygons(Vec<Vec<Point>>),
}

impl BoundaryPayload {
    /// Renders a boundary set with every ring closed, or `None` when the
    /// set is empty.
    #[must_use]
    pub fn from_boundary(boundary: &BoundarySet) -> Option<Self> {
        let closed = boundary.closed();
        match closed.polygons() {
            [] => None,
            [single] => Some(Self::Polygon(single.points().to_vec())),
            many => Some(Self::Polygons(
                many.iter().map(|p| p.points().to_vec()).collect(),
            )),
        }
    }

    /// Converts back into a boundary set.
    #[must_use]
    pub fn to_boundary_set(&self) -> BoundarySet {
        match self {
            Self::Polygon(points) => BoundarySet(vec![Polygon(points.clone())]),
            Self::Polygons(polygons) => {
                BoundarySet(polygons.iter().cloned().map(Polygon).collect())
            }
        }
    }
}
