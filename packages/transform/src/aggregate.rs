//! Same-name merging of document fragments.
//!
//! Entities are keyed by normalized name (trimmed, lowercased). The first
//! non-empty value seen for a field wins; later fragments, catalog records
//! and enrichment results only fill fields that are still empty.

use std::collections::{BTreeMap, BTreeSet};

use elk_catalog::CatalogRecord;
use elk_catalog_models::{HazardCategory, LocationKind, Severity};
use elk_geometry::{BoundarySet, Point};

use crate::document::{Document, HazardFragment, LocationFragment, PresentationFragment};

/// The dedup key for an entity name.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

fn fill_boundary(slot: &mut BoundarySet, value: &BoundarySet) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value.clone();
    }
}

/// A location accumulated across documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationEntry {
    /// Display name from the first fragment that mentioned the location.
    pub name: String,
    /// Catalog or synthetic id.
    pub id: Option<String>,
    /// Kind of area.
    pub kind: Option<LocationKind>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Description.
    pub description: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// External place id.
    pub google_maps_id: Option<String>,
    /// Boundary; empty means none.
    pub boundary: BoundarySet,
    /// Presentations keyed by normalized hazard name.
    pub presentations: BTreeMap<String, PresentationEntry>,
}

/// A hazard's presentation at one location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationEntry {
    /// Boundary; empty means none.
    pub boundary: BoundarySet,
    /// Distinct notes.
    pub notes: BTreeSet<String>,
}

/// A hazard accumulated across documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HazardEntry {
    /// Display name from the first fragment that mentioned the hazard.
    pub name: String,
    /// Catalog or synthetic id.
    pub id: Option<String>,
    /// Severity.
    pub severity: Option<Severity>,
    /// Category.
    pub category: Option<HazardCategory>,
    /// Description.
    pub description: Option<String>,
}

impl LocationEntry {
    /// Creates an empty entry named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Self::default()
        }
    }

    /// Fills empty fields from a fragment.
    pub fn merge(&mut self, fragment: &LocationFragment) {
        fill(&mut self.kind, fragment.kind);
        fill(&mut self.latitude, fragment.latitude);
        fill(&mut self.longitude, fragment.longitude);
        fill(&mut self.description, fragment.description.clone());
        fill(&mut self.image, fragment.image.clone());
        fill(&mut self.google_maps_id, fragment.google_maps_id.clone());
        fill_boundary(&mut self.boundary, &fragment.boundary);
    }

    /// Fills empty fields from a matched catalog record and takes its id.
    pub fn merge_record(&mut self, record: &CatalogRecord) {
        if let Some(fragment) = LocationFragment::from_value(&record.fields) {
            self.merge(&fragment);
        }
        if record.id.is_some() {
            self.id.clone_from(&record.id);
        }
    }

    /// Folds a presentation of hazard `hazard_key` into this location.
    pub fn merge_presentation(&mut self, hazard_key: &str, fragment: &PresentationFragment) {
        let entry = self.presentations.entry(hazard_key.to_string()).or_default();
        fill_boundary(&mut entry.boundary, &fragment.boundary);
        if let Some(note) = &fragment.note {
            entry.notes.insert(note.clone());
        }
    }

    /// Whether any field enrichment could supply is still empty.
    #[must_use]
    pub fn needs_enrichment(&self) -> bool {
        self.latitude.is_none()
            || self.longitude.is_none()
            || self.boundary.is_empty()
            || self.image.is_none()
            || self.google_maps_id.is_none()
    }

    /// Fills empty coordinate fields from `point`.
    pub fn fill_coordinates(&mut self, point: Option<Point>) {
        if let Some(point) = point {
            fill(&mut self.latitude, Some(point.latitude));
            fill(&mut self.longitude, Some(point.longitude));
        }
    }

    /// Fills the remaining enrichment fields.
    pub fn fill_enrichment(
        &mut self,
        image: Option<String>,
        google_maps_id: Option<String>,
        boundary: &BoundarySet,
    ) {
        fill(&mut self.image, image);
        fill(&mut self.google_maps_id, google_maps_id);
        fill_boundary(&mut self.boundary, boundary);
    }
}

impl HazardEntry {
    /// Creates an empty entry named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..Self::default()
        }
    }

    /// Fills empty fields from a fragment.
    pub fn merge(&mut self, fragment: &HazardFragment) {
        fill(&mut self.severity, fragment.severity);
        fill(&mut self.category, fragment.category);
        fill(&mut self.description, fragment.description.clone());
    }

    /// Fills empty fields from a matched catalog record and takes its id.
    pub fn merge_record(&mut self, record: &CatalogRecord) {
        if let Some(fragment) = HazardFragment::from_value(&record.fields) {
            self.merge(&fragment);
        }
        if record.id.is_some() {
            self.id.clone_from(&record.id);
        }
    }
}

/// All entities of one run, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Locations by normalized name.
    pub locations: BTreeMap<String, LocationEntry>,
    /// Hazards by normalized name.
    pub hazards: BTreeMap<String, HazardEntry>,
}

impl Aggregate {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn location_mut(&mut self, name: &str) -> &mut LocationEntry {
        self.locations
            .entry(normalize_name(name))
            .or_insert_with(|| LocationEntry::new(name))
    }

    /// Merges one document: its locations first, then its hazards and
    /// their presentations. A presentation naming an unknown location
    /// creates that location.
    pub fn ingest(&mut self, document: &Document) {
        for fragment in &document.locations {
            self.location_mut(&fragment.name).merge(fragment);
        }

        for fragment in &document.hazards {
            let hazard_key = normalize_name(&fragment.name);
            self.hazards
                .entry(hazard_key.clone())
                .or_insert_with(|| HazardEntry::new(&fragment.name))
                .merge(fragment);

            for presentation in &fragment.presentations {
                self.location_mut(&presentation.location)
                    .merge_presentation(&hazard_key, presentation);
            }
        }
    }
}
