#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hazard catalog types.
//!
//! Defines the closed vocabularies shared by the consolidation pipeline
//! and the catalog (severity, hazard category, location kind) and the
//! records the catalog stores.

use elk_geometry_models::Point;
use elk_matching::Named;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How dangerous a hazard is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Minor risk.
    Low,
    /// Moderate risk.
    Medium,
    /// Serious risk.
    High,
}

/// What kind of thing a hazard is. Serialized as the hazard's `type`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HazardCategory {
    /// Wildlife (bears, snakes, ...).
    Animal,
    /// Scheduled or one-off events (closures, hunts, ...).
    Event,
    /// Weather conditions (flooding, avalanches, ...).
    Weather,
    /// Illness vectors (hantavirus, giardia, ...).
    Disease,
}

/// What kind of area a location is. Serialized as the location's `type`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum LocationKind {
    /// A national park.
    #[serde(rename = "National Park")]
    #[strum(serialize = "National Park")]
    NationalPark,
    /// Any other named region.
    #[serde(rename = "Region")]
    #[strum(serialize = "Region")]
    Region,
}

/// Parses a free-text vocabulary value, ignoring surrounding whitespace
/// and ASCII case. Unknown values yield `None`.
#[must_use]
pub fn parse_choice<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// A canonical location stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Catalog identifier.
    pub id: String,
    /// Unique display name.
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
    /// Raw boundary as stored; normalized on read.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub boundary: serde_json::Value,
}

/// A canonical hazard stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    /// Catalog identifier.
    pub id: String,
    /// Unique display name.
    pub name: String,
    /// Severity, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Category, when known.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<HazardCategory>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Safety advice attached to one or more hazards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    /// Unique tip name.
    pub name: String,
    /// Advice text.
    pub description: String,
    /// Hazards this tip applies to.
    #[serde(default)]
    pub hazard_ids: Vec<String>,
}

/// The extent of a hazard at (optionally) a specific location.
///
/// A presentation covers a point when the point lies within its circle
/// or within its boundary polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// Catalog-assigned sequence number.
    pub id: u64,
    /// Hazard being presented.
    pub hazard_id: String,
    /// Location the presentation belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Circle center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Point>,
    /// Circle radius in meters (0 means no circle).
    #[serde(default)]
    pub radius_meters: f64,
    /// Raw boundary as stored; normalized on read.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub boundary: serde_json::Value,
    /// Free-text notes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

/// One hazard found at a queried point, with the presentations that
/// matched and the hazard's tips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardAtPoint {
    /// The hazard.
    #[serde(flatten)]
    pub hazard: Hazard,
    /// Tips attached to the hazard.
    pub tips: Vec<Tip>,
    /// Presentations of the hazard that contain the point.
    pub presentations: Vec<Presentation>,
}

impl Named for Location {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Hazard {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vocabularies_case_insensitively() {
        assert_eq!(parse_choice::<Severity>(" HIGH "), Some(Severity::High));
        assert_eq!(parse_choice::<HazardCategory>("Weather"), Some(HazardCategory::Weather));
        assert_eq!(
            parse_choice::<LocationKind>("national park"),
            Some(LocationKind::NationalPark)
        );
        assert_eq!(parse_choice::<LocationKind>("REGION"), Some(LocationKind::Region));
    }

    #[test]
    fn unknown_vocabulary_values_are_dropped() {
        assert_eq!(parse_choice::<Severity>("extreme"), None);
        assert_eq!(parse_choice::<HazardCategory>(""), None);
        assert_eq!(parse_choice::<LocationKind>("State Forest"), None);
    }

    #[test]
    fn serializes_with_wire_names() {
        assert_eq!(
            serde_json::to_value(LocationKind::NationalPark).unwrap(),
            serde_json::json!("National Park")
        );
        assert_eq!(
            serde_json::to_value(HazardCategory::Animal).unwrap(),
            serde_json::json!("animal")
        );
        assert_eq!(Severity::Medium.to_string(), "medium");
        assert_eq!(LocationKind::Region.as_ref(), "Region");
    }

    #[test]
    fn hazard_type_field_is_renamed() {
        let hazard = Hazard {
            id: "7".to_string(),
            name: "Bear Activity".to_string(),
            severity: Some(Severity::High),
            category: Some(HazardCategory::Animal),
            description: None,
        };
        let value = serde_json::to_value(&hazard).unwrap();
        assert_eq!(value["type"], "animal");
        assert!(value.get("description").is_none());
    }
}
