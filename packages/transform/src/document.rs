//! Lenient decoding of extraction document fragments.
//!
//! Extraction documents are produced upstream and only loosely follow a
//! schema. Every field is read independently: a field with the wrong type
//! is treated as absent, and a fragment is only dropped when it is not an
//! object or has no usable name. Boundaries that fail normalization are
//! treated as absent.

use elk_catalog_models::{HazardCategory, LocationKind, Severity, parse_choice};
use elk_geometry::{BoundarySet, normalize_boundary_value};
use elk_geometry_models::Coordinate;
use serde::Deserialize as _;
use serde_json::Value;

/// One extraction document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Location fragments, in document order.
    pub locations: Vec<LocationFragment>,
    /// Hazard fragments, in document order.
    pub hazards: Vec<HazardFragment>,
}

/// A location as described by one document (or one catalog record).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFragment {
    /// Trimmed, non-empty name.
    pub name: String,
    /// Kind, when recognized.
    pub kind: Option<LocationKind>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Trimmed description.
    pub description: Option<String>,
    /// Trimmed image URL.
    pub image: Option<String>,
    /// Trimmed external place id.
    pub google_maps_id: Option<String>,
    /// Normalized boundary; empty when absent or invalid.
    pub boundary: BoundarySet,
}

/// A hazard as described by one document (or one catalog record).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HazardFragment {
    /// Trimmed, non-empty name.
    pub name: String,
    /// Severity, when recognized.
    pub severity: Option<Severity>,
    /// Category, when recognized.
    pub category: Option<HazardCategory>,
    /// Trimmed description.
    pub description: Option<String>,
    /// Where the hazard presents.
    pub presentations: Vec<PresentationFragment>,
}

/// A hazard's presentation at a named location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationFragment {
    /// Trimmed, non-empty location name.
    pub location: String,
    /// Normalized boundary; empty when absent or invalid.
    pub boundary: BoundarySet,
    /// `notes`, falling back to `description`.
    pub note: Option<String>,
}

/// Trimmed non-empty string field.
fn text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Number or numeric string field.
fn coordinate(value: &Value, key: &str) -> Option<f64> {
    Coordinate::deserialize(value.get(key)?).ok()?.value()
}

fn choice<T: std::str::FromStr>(value: &Value, key: &str) -> Option<T> {
    parse_choice(value.get(key)?.as_str()?)
}

fn boundary(value: &Value, name: &str) -> BoundarySet {
    match value.get("boundary") {
        None | Some(Value::Null) => BoundarySet::empty(),
        Some(raw) => normalize_boundary_value(raw).unwrap_or_else(|e| {
            log::debug!("Ignoring boundary for '{name}': {e}");
            BoundarySet::empty()
        }),
    }
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

impl Document {
    /// Decodes a document. Returns `None` if `value` is not a JSON object.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            locations: array(value, "locations")
                .iter()
                .filter_map(LocationFragment::from_value)
                .collect(),
            hazards: array(value, "hazards")
                .iter()
                .filter_map(HazardFragment::from_value)
                .collect(),
        })
    }
}

impl LocationFragment {
    /// Decodes a location fragment, or `None` if it has no usable name.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let Some(name) = text(value, "name") else {
            log::debug!("Skipping location fragment without a name: {value}");
            return None;
        };
        Some(Self {
            kind: choice(value, "type"),
            latitude: coordinate(value, "latitude"),
            longitude: coordinate(value, "longitude"),
            description: text(value, "description"),
            image: text(value, "image"),
            google_maps_id: text(value, "google_maps_id").or_else(|| text(value, "googleMapsId")),
            boundary: boundary(value, &name),
            name,
        })
    }
}

impl HazardFragment {
    /// Decodes a hazard fragment, or `None` if it has no usable name.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let Some(name) = text(value, "name") else {
            log::debug!("Skipping hazard fragment without a name: {value}");
            return None;
        };
        Some(Self {
            severity: choice(value, "severity"),
            category: choice(value, "type"),
            description: text(value, "description"),
            presentations: array(value, "presentations")
                .iter()
                .filter_map(PresentationFragment::from_value)
                .collect(),
            name,
        })
    }
}

impl PresentationFragment {
    /// Decodes a presentation fragment, or `None` if it names no location.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let Some(location) = text(value, "location") else {
            log::debug!("Skipping presentation without a location: {value}");
            return None;
        };
        Some(Self {
            boundary: boundary(value, &location),
            note: text(value, "notes").or_else(|| text(value, "description")),
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use elk_geometry::Point;
    use serde_json::json;

    use super::*;

    #[test]
    fn non_objects_are_not_documents() {
        assert!(Document::from_value(&json!([1, 2])).is_none());
        assert!(Document::from_value(&json!("doc")).is_none());
        assert_eq!(Document::from_value(&json!({})), Some(Document::default()));
    }

    #[test]
    fn malformed_fragments_are_skipped() {
        let doc = Document::from_value(&json!({
            "locations": [
                "Rocky Park",
                {"name": "   "},
                {"name": 12},
                {"name": " Rocky Park "}
            ],
            "hazards": [
                null,
                {"severity": "high"},
                {"name": "Bear Activity", "presentations": [
                    {"notes": "no location"},
                    7,
                    {"location": "Rocky Park"}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(doc.locations.len(), 1);
        assert_eq!(doc.locations[0].name, "Rocky Park");
        assert_eq!(doc.hazards.len(), 1);
        assert_eq!(doc.hazards[0].presentations.len(), 1);
    }

    #[test]
    fn fields_are_read_leniently() {
        let location = LocationFragment::from_value(&json!({
            "name": "Rocky Park",
            "type": "national park",
            "latitude": "40.3428",
            "longitude": -105.6836,
            "description": "  ",
            "image": 5,
            "googleMapsId": " place-1 ",
            "boundary": [
                {"lat": "40.0", "lng": -106.0},
                [40.0, -105.0],
                {"latitude": 41.0, "lon": "-105.0"}
            ]
        }))
        .unwrap();

        assert_eq!(location.kind, Some(LocationKind::NationalPark));
        assert_eq!(location.latitude, Some(40.3428));
        assert_eq!(location.longitude, Some(-105.6836));
        assert!(location.description.is_none());
        assert!(location.image.is_none());
        assert_eq!(location.google_maps_id.as_deref(), Some("place-1"));
        assert_eq!(location.boundary.polygons().len(), 1);
        assert_eq!(location.boundary.polygons()[0].points()[0], Point::new(40.0, -106.0));
    }

    #[test]
    fn unknown_vocabulary_and_bad_boundaries_are_absent() {
        let hazard = HazardFragment::from_value(&json!({
            "name": "Bear Activity",
            "severity": "extreme",
            "type": 3
        }))
        .unwrap();
        assert!(hazard.severity.is_none());
        assert!(hazard.category.is_none());

        let location = LocationFragment::from_value(&json!({
            "name": "Rocky Park",
            "type": "State Forest",
            "boundary": [[40.0, -106.0], [40.0, -105.0]]
        }))
        .unwrap();
        assert!(location.kind.is_none());
        assert!(location.boundary.is_empty());
    }

    #[test]
    fn presentation_note_falls_back_to_description() {
        let with_notes = PresentationFragment::from_value(&json!({
            "location": "Rocky Park",
            "notes": "Stay alert.",
            "description": "ignored"
        }))
        .unwrap();
        assert_eq!(with_notes.note.as_deref(), Some("Stay alert."));

        let with_description = PresentationFragment::from_value(&json!({
            "location": "Rocky Park",
            "notes": "",
            "description": " Bears near trailheads. "
        }))
        .unwrap();
        assert_eq!(with_description.note.as_deref(), Some("Bears near trailheads."));
    }
}
