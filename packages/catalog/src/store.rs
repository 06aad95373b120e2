//! In-memory hazard catalog.
//!
//! [`CatalogStore`] is what the catalog does with a consolidated payload:
//! it upserts locations and hazards by name, keeps one presentation per
//! (hazard, location) pair, and answers two kinds of queries:
//!
//! - fuzzy name search over locations and hazards
//! - "which hazards cover this point", where a presentation covers a point
//!   if the point is inside its circle or inside its boundary polygons
//!
//! Point queries go through an R-tree of presentation envelopes first; the
//! exact circle and polygon tests only run on that short list.

use std::collections::BTreeMap;

use async_trait::async_trait;
use elk_catalog_models::{Hazard, HazardAtPoint, Location, Presentation, Tip};
use elk_geometry::{
    BoundarySet, Point, Polygon, circle::DEFAULT_SEGMENTS, circle_boundary,
    normalize_boundary_value, point_within_boundary, point_within_circle,
};
use elk_matching::{MAX_LIMIT, clamp_limit, rank_top_n};
use elk_spatial::{PresentationIndex, boundary_envelope, circle_envelope, merge_envelopes};
use elk_transform_models::{BoundaryPayload, LocationPayload, TransformOutput};

use crate::{CatalogError, CatalogRecord, CatalogSearch};

/// Counts of what an ingest touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Locations created or updated.
    pub locations: usize,
    /// Hazards created or updated.
    pub hazards: usize,
    /// Presentations created or replaced.
    pub presentations: usize,
}

/// A new presentation described by a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPresentation {
    /// Circle center.
    pub center: Point,
    /// Circle radius in meters; must be positive.
    pub radius_meters: f64,
    /// Location the presentation belongs to, if any.
    pub location_id: Option<String>,
    /// Free-text notes.
    pub notes: String,
}

/// Locations, hazards, tips and presentations held in memory.
#[derive(Debug, Default)]
pub struct CatalogStore {
    locations: BTreeMap<String, Location>,
    hazards: BTreeMap<String, Hazard>,
    tips: Vec<Tip>,
    presentations: BTreeMap<u64, Presentation>,
    index: PresentationIndex,
    next_location_id: u64,
    next_hazard_id: u64,
    next_presentation_id: u64,
}

fn normalized(name: &str) -> String {
    name.trim().to_lowercase()
}

fn polygon_value(polygon: &Polygon) -> serde_json::Value {
    polygon
        .points()
        .iter()
        .map(|p| serde_json::json!({"latitude": p.latitude, "longitude": p.longitude}))
        .collect()
}

fn boundary_value(boundary: Option<&BoundaryPayload>) -> serde_json::Value {
    match boundary.map(BoundaryPayload::to_boundary_set) {
        Some(set) if set.polygons().len() == 1 => polygon_value(&set.polygons()[0]),
        Some(set) if !set.is_empty() => set.polygons().iter().map(polygon_value).collect(),
        _ => serde_json::Value::Null,
    }
}

fn presentation_boundary(presentation: &Presentation) -> Option<BoundarySet> {
    if presentation.boundary.is_null() {
        return None;
    }
    match normalize_boundary_value(&presentation.boundary) {
        Ok(set) => Some(set),
        Err(e) => {
            log::debug!("Ignoring boundary of presentation {}: {e}", presentation.id);
            None
        }
    }
}

fn covers(presentation: &Presentation, point: Point) -> bool {
    let in_circle = presentation
        .center
        .is_some_and(|center| point_within_circle(point, center, presentation.radius_meters));

    in_circle
        || presentation_boundary(presentation)
            .is_some_and(|boundary| point_within_boundary(&boundary, point))
}

fn search_limit(limit: Option<i64>) -> Result<usize, CatalogError> {
    match limit {
        Some(n) if n <= 0 => Err(CatalogError::InvalidQuery {
            message: "limit must be a positive integer".to_string(),
        }),
        Some(n) => Ok(clamp_limit(Some(usize::try_from(n).unwrap_or(MAX_LIMIT)))),
        None => Ok(clamp_limit(None)),
    }
}

fn search_query(query: &str) -> Result<&str, CatalogError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidQuery {
            message: "q is required".to_string(),
        });
    }
    Ok(trimmed)
}

impl CatalogStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a location by id.
    #[must_use]
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Looks up a hazard by id.
    #[must_use]
    pub fn hazard(&self, id: &str) -> Option<&Hazard> {
        self.hazards.get(id)
    }

    /// Looks up a presentation by id.
    #[must_use]
    pub fn presentation(&self, id: u64) -> Option<&Presentation> {
        self.presentations.get(&id)
    }

    /// All presentations, in id order.
    pub fn presentations(&self) -> impl Iterator<Item = &Presentation> {
        self.presentations.values()
    }

    fn location_id_by_name(&self, name: &str) -> Option<String> {
        let key = normalized(name);
        self.locations
            .values()
            .find(|l| normalized(&l.name) == key)
            .map(|l| l.id.clone())
    }

    fn hazard_id_by_name(&self, name: &str) -> Option<String> {
        let key = normalized(name);
        self.hazards
            .values()
            .find(|h| normalized(&h.name) == key)
            .map(|h| h.id.clone())
    }

    /// Inserts a location, or updates the one with the same name.
    ///
    /// On update the stored id is kept and every field the incoming
    /// record supplies replaces the stored value. New locations get a
    /// store-assigned id; the incoming id is ignored. Returns the stored
    /// id.
    pub fn upsert_location(&mut self, location: Location) -> String {
        if let Some(id) = self.location_id_by_name(&location.name)
            && let Some(existing) = self.locations.get_mut(&id)
        {
            existing.name = location.name;
            existing.kind = location.kind.or(existing.kind);
            existing.latitude = location.latitude.or(existing.latitude);
            existing.longitude = location.longitude.or(existing.longitude);
            existing.description = location.description.or(existing.description.take());
            existing.image = location.image.or(existing.image.take());
            existing.google_maps_id = location.google_maps_id.or(existing.google_maps_id.take());
            if !location.boundary.is_null() {
                existing.boundary = location.boundary;
            }
            return id;
        }

        self.next_location_id += 1;
        let id = self.next_location_id.to_string();
        self.locations.insert(
            id.clone(),
            Location {
                id: id.clone(),
                ..location
            },
        );
        id
    }

    /// Inserts a hazard, or updates the one with the same name. Same
    /// rules as [`Self::upsert_location`].
    pub fn upsert_hazard(&mut self, hazard: Hazard) -> String {
        if let Some(id) = self.hazard_id_by_name(&hazard.name)
            && let Some(existing) = self.hazards.get_mut(&id)
        {
            existing.name = hazard.name;
            existing.severity = hazard.severity.or(existing.severity);
            existing.category = hazard.category.or(existing.category);
            existing.description = hazard.description.or(existing.description.take());
            return id;
        }

        self.next_hazard_id += 1;
        let id = self.next_hazard_id.to_string();
        self.hazards.insert(
            id.clone(),
            Hazard {
                id: id.clone(),
                ..hazard
            },
        );
        id
    }

    /// Adds a tip. A tip with the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownHazard`] if the tip references a
    /// hazard the store does not hold.
    pub fn add_tip(&mut self, tip: Tip) -> Result<(), CatalogError> {
        if let Some(id) = tip.hazard_ids.iter().find(|id| !self.hazards.contains_key(*id)) {
            return Err(CatalogError::UnknownHazard { id: id.clone() });
        }
        self.tips.retain(|t| t.name != tip.name);
        self.tips.push(tip);
        Ok(())
    }

    /// Adds a circular presentation of `hazard_id`.
    ///
    /// The stored boundary is the circle approximated with the default
    /// number of segments.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownHazard`] if the hazard does not
    /// exist, or [`CatalogError::Geometry`] if the radius is not positive.
    pub fn add_presentation(
        &mut self,
        hazard_id: &str,
        new: NewPresentation,
    ) -> Result<u64, CatalogError> {
        if !self.hazards.contains_key(hazard_id) {
            return Err(CatalogError::UnknownHazard {
                id: hazard_id.to_string(),
            });
        }
        let circle = circle_boundary(new.center, new.radius_meters, DEFAULT_SEGMENTS)?;

        self.next_presentation_id += 1;
        let presentation = Presentation {
            id: self.next_presentation_id,
            hazard_id: hazard_id.to_string(),
            location_id: new.location_id,
            center: Some(new.center),
            radius_meters: new.radius_meters,
            boundary: polygon_value(&circle),
            notes: new.notes,
        };
        let id = presentation.id;
        self.store_presentation(presentation);
        Ok(id)
    }

    fn store_presentation(&mut self, presentation: Presentation) {
        let circle = presentation
            .center
            .and_then(|center| circle_envelope(center, presentation.radius_meters));
        let boundary = presentation_boundary(&presentation).and_then(|b| boundary_envelope(&b));
        let envelope = match (circle, boundary) {
            (Some(a), Some(b)) => Some(merge_envelopes(a, b)),
            (a, b) => a.or(b),
        };

        self.index.remove(presentation.id);
        if let Some(envelope) = envelope {
            self.index.insert(presentation.id, envelope);
        } else {
            log::debug!(
                "Presentation {} has no usable extent and will never match a point",
                presentation.id
            );
        }
        self.presentations.insert(presentation.id, presentation);
    }

    /// Loads a consolidated payload.
    ///
    /// Hazards and locations are upserted by name. Each location's
    /// presentations replace any existing presentation of the same
    /// hazard at that location; the presentation takes the location's
    /// coordinates as its center and the payload boundary as its extent.
    /// Notes are joined with newlines.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownHazard`] if a presentation names a
    /// hazard that is neither in the payload nor already stored.
    pub fn ingest_payload(&mut self, payload: &TransformOutput) -> Result<IngestSummary, CatalogError> {
        let mut summary = IngestSummary::default();
        let mut hazard_ids = BTreeMap::new();

        for hazard in &payload.hazards {
            let stored = self.upsert_hazard(Hazard {
                id: hazard.id.clone(),
                name: hazard.name.clone(),
                severity: hazard.severity,
                category: hazard.category,
                description: hazard.description.clone(),
            });
            hazard_ids.insert(hazard.id.clone(), stored);
            summary.hazards += 1;
        }

        for location in &payload.locations {
            let location_id = self.upsert_location(location_record(location));
            summary.locations += 1;

            for presentation in &location.presentations {
                let hazard_id = hazard_ids
                    .get(&presentation.hazard_id)
                    .cloned()
                    .or_else(|| self.hazard_id_by_name(&presentation.hazard_name))
                    .ok_or_else(|| CatalogError::UnknownHazard {
                        id: presentation.hazard_id.clone(),
                    })?;

                let existing = self
                    .presentations
                    .values()
                    .find(|p| {
                        p.hazard_id == hazard_id && p.location_id.as_deref() == Some(&location_id)
                    })
                    .map(|p| p.id);
                let id = existing.unwrap_or_else(|| {
                    self.next_presentation_id += 1;
                    self.next_presentation_id
                });

                let center = location
                    .latitude
                    .zip(location.longitude)
                    .map(|(lat, lng)| Point::new(lat, lng));

                self.store_presentation(Presentation {
                    id,
                    hazard_id,
                    location_id: Some(location_id.clone()),
                    center,
                    radius_meters: 0.0,
                    boundary: boundary_value(presentation.boundary.as_ref()),
                    notes: presentation
                        .notes
                        .as_ref()
                        .map(|n| n.to_vec().join("\n"))
                        .unwrap_or_default(),
                });
                summary.presentations += 1;
            }
        }

        log::info!(
            "Ingested {} locations, {} hazards, {} presentations",
            summary.locations,
            summary.hazards,
            summary.presentations
        );
        Ok(summary)
    }

    /// Fuzzy search over location names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidQuery`] if `query` is blank or
    /// `limit` is not positive.
    pub fn search_locations(&self, query: &str, limit: Option<i64>) -> Result<Vec<Location>, CatalogError> {
        let query = search_query(query)?;
        let limit = search_limit(limit)?;
        Ok(rank_top_n(self.locations.values(), query, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Fuzzy search over hazard names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidQuery`] if `query` is blank or
    /// `limit` is not positive.
    pub fn search_hazards(&self, query: &str, limit: Option<i64>) -> Result<Vec<Hazard>, CatalogError> {
        let query = search_query(query)?;
        let limit = search_limit(limit)?;
        Ok(rank_top_n(self.hazards.values(), query, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Hazards with at least one presentation covering `point`, sorted by
    /// hazard name, each with its tips and the covering presentations.
    ///
    /// Presentations whose stored boundary cannot be normalized are still
    /// tested against their circle.
    #[must_use]
    pub fn hazards_at(&self, point: Point) -> Vec<HazardAtPoint> {
        let mut grouped: BTreeMap<&str, Vec<Presentation>> = BTreeMap::new();

        let candidates = self.index.candidates(point);
        log::trace!(
            "{} of {} indexed presentations are candidates",
            candidates.len(),
            self.index.size()
        );
        for id in candidates {
            let Some(presentation) = self.presentations.get(&id) else {
                continue;
            };
            if covers(presentation, point) {
                grouped
                    .entry(presentation.hazard_id.as_str())
                    .or_default()
                    .push(presentation.clone());
            }
        }

        let mut results: Vec<HazardAtPoint> = grouped
            .into_iter()
            .filter_map(|(hazard_id, presentations)| {
                let hazard = self.hazards.get(hazard_id)?.clone();
                let mut tips: Vec<Tip> = self
                    .tips
                    .iter()
                    .filter(|t| t.hazard_ids.iter().any(|h| h == hazard_id))
                    .cloned()
                    .collect();
                tips.sort_by(|a, b| a.name.cmp(&b.name));
                Some(HazardAtPoint {
                    hazard,
                    tips,
                    presentations,
                })
            })
            .collect();

        results.sort_by_key(|h| h.hazard.name.to_lowercase());
        log::debug!(
            "{} hazards at ({}, {})",
            results.len(),
            point.latitude,
            point.longitude
        );
        results
    }
}

fn location_record(location: &LocationPayload) -> Location {
    Location {
        id: location.id.clone(),
        name: location.name.clone(),
        kind: location.kind,
        latitude: location.latitude,
        longitude: location.longitude,
        description: location.description.clone(),
        image: location.image.clone(),
        google_maps_id: location.google_maps_id.clone(),
        boundary: boundary_value(location.boundary.as_ref()),
    }
}

fn records<T: serde::Serialize>(items: &[T]) -> Vec<CatalogRecord> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .filter_map(|value| CatalogRecord::from_value(&value))
        .collect()
}

#[async_trait]
impl CatalogSearch for CatalogStore {
    async fn search_locations(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(records(&Self::search_locations(self, query, Some(limit))?))
    }

    async fn search_hazards(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(records(&Self::search_hazards(self, query, Some(limit))?))
    }
}

#[cfg(test)]
mod tests {
    use elk_catalog_models::{HazardCategory, LocationKind, Severity};
    use elk_transform_models::{HazardPayload, Notes, PresentationPayload};

    use super::*;

    fn location(name: &str, lat: f64, lng: f64) -> Location {
        Location {
            id: String::new(),
            name: name.to_string(),
            kind: Some(LocationKind::NationalPark),
            latitude: Some(lat),
            longitude: Some(lng),
            description: None,
            image: None,
            google_maps_id: None,
            boundary: serde_json::json!([{"latitude": lat, "longitude": lng}]),
        }
    }

    fn hazard(name: &str, severity: Severity, category: HazardCategory) -> Hazard {
        Hazard {
            id: String::new(),
            name: name.to_string(),
            severity: Some(severity),
            category: Some(category),
            description: None,
        }
    }

    fn circle(lat: f64, lng: f64, radius_meters: f64, location_id: Option<String>) -> NewPresentation {
        NewPresentation {
            center: Point::new(lat, lng),
            radius_meters,
            location_id,
            notes: String::new(),
        }
    }

    fn park_store() -> (CatalogStore, String, String) {
        let mut store = CatalogStore::new();
        let bear = store.upsert_hazard(hazard("Bear", Severity::High, HazardCategory::Animal));
        store
            .add_tip(Tip {
                name: "Bear Spray".to_string(),
                description: "Carry bear spray at all times.".to_string(),
                hazard_ids: vec![bear.clone()],
            })
            .unwrap();
        let rocky = store.upsert_location(location("Rocky Mountain National Park", 40.3428, -105.6836));
        store
            .add_presentation(&bear, circle(40.34, -105.68, 5_000.0, Some(rocky.clone())))
            .unwrap();

        let avalanche =
            store.upsert_hazard(hazard("Avalanche", Severity::Medium, HazardCategory::Weather));
        store
            .add_presentation(&avalanche, circle(38.5, -106.0, 1_000.0, None))
            .unwrap();
        (store, bear, rocky)
    }

    #[test]
    fn hazards_at_returns_covering_hazard_with_tips() {
        let (store, bear, rocky) = park_store();
        let found = store.hazards_at(Point::new(40.34, -105.68));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hazard.id, bear);
        assert_eq!(found[0].tips.len(), 1);
        assert_eq!(found[0].presentations.len(), 1);
        assert_eq!(found[0].presentations[0].location_id.as_deref(), Some(rocky.as_str()));
    }

    #[test]
    fn hazards_at_empty_far_away() {
        let (store, _, _) = park_store();
        assert!(store.hazards_at(Point::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn circle_covers_point_even_with_invalid_boundary() {
        let (mut store, bear, _) = park_store();
        let id = store
            .add_presentation(&bear, circle(10.0, 10.0, 2_000.0, None))
            .unwrap();
        let mut broken = store.presentation(id).unwrap().clone();
        broken.boundary = serde_json::json!([{"latitude": 10.0, "longitude": 10.0}]);
        store.store_presentation(broken);

        let found = store.hazards_at(Point::new(10.0, 10.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].presentations[0].id, id);
    }

    #[test]
    fn add_presentation_stores_circle_boundary() {
        let (mut store, bear, _) = park_store();
        let id = store
            .add_presentation(&bear, circle(39.74, -104.99, 2_000.0, None))
            .unwrap();
        let stored = store.presentation(id).unwrap();
        assert!((stored.radius_meters - 2_000.0).abs() < f64::EPSILON);
        assert_eq!(stored.boundary.as_array().unwrap().len(), DEFAULT_SEGMENTS);
    }

    #[test]
    fn add_presentation_rejects_bad_input() {
        let (mut store, bear, _) = park_store();
        assert!(matches!(
            store.add_presentation(&bear, circle(39.74, -104.99, 0.0, None)),
            Err(CatalogError::Geometry(_))
        ));
        assert!(matches!(
            store.add_presentation("999", circle(39.74, -104.99, 10.0, None)),
            Err(CatalogError::UnknownHazard { .. })
        ));
    }

    #[test]
    fn location_search_tolerates_typos() {
        let mut store = CatalogStore::new();
        let rocky = store.upsert_location(location("Rocky Mountain National Park", 40.3428, -105.6836));
        store.upsert_location(location("Yosemite National Park", 37.8651, -119.5383));

        let found = store.search_locations("rokky", None).unwrap();
        assert!(!found.is_empty());
        assert_eq!(found[0].id, rocky);
        assert!(!found[0].boundary.is_null());
    }

    #[test]
    fn hazard_search_and_limit() {
        let mut store = CatalogStore::new();
        let bear = store.upsert_hazard(hazard("Bear Activity", Severity::High, HazardCategory::Animal));
        store.upsert_hazard(hazard("Avalanche Risk", Severity::Medium, HazardCategory::Weather));

        let found = store.search_hazards("berr", None).unwrap();
        assert!(found.iter().any(|h| h.id == bear));

        store.upsert_hazard(hazard("Bear Advisory", Severity::Low, HazardCategory::Animal));
        assert_eq!(store.search_hazards("bear", Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn search_rejects_blank_query_and_bad_limit() {
        let store = CatalogStore::new();
        assert!(matches!(
            store.search_hazards("  ", None),
            Err(CatalogError::InvalidQuery { .. })
        ));
        assert!(matches!(
            store.search_locations("rocky", Some(0)),
            Err(CatalogError::InvalidQuery { .. })
        ));
        assert!(matches!(
            store.search_locations("rocky", Some(-3)),
            Err(CatalogError::InvalidQuery { .. })
        ));
        assert!(store.search_locations("rocky", Some(500)).unwrap().is_empty());
    }

    #[test]
    fn upsert_matches_names_case_insensitively() {
        let mut store = CatalogStore::new();
        let first = store.upsert_hazard(hazard("Bear", Severity::High, HazardCategory::Animal));
        let second = store.upsert_hazard(Hazard {
            description: Some("Black bears.".to_string()),
            severity: None,
            ..hazard(" bear ", Severity::Low, HazardCategory::Animal)
        });
        assert_eq!(first, second);
        let stored = store.hazard(&first).unwrap();
        assert_eq!(stored.severity, Some(Severity::High));
        assert_eq!(stored.description.as_deref(), Some("Black bears."));
    }

    fn payload() -> TransformOutput {
        let square = BoundaryPayload::Polygon(vec![
            Point::new(40.0, -106.0),
            Point::new(40.0, -105.0),
            Point::new(41.0, -105.0),
            Point::new(41.0, -106.0),
            Point::new(40.0, -106.0),
        ]);
        TransformOutput {
            locations: vec![LocationPayload {
                id: "new-location-1".to_string(),
                name: "Rocky Park".to_string(),
                kind: Some(LocationKind::NationalPark),
                latitude: Some(40.5),
                longitude: Some(-105.5),
                description: None,
                image: None,
                google_maps_id: None,
                boundary: Some(square.clone()),
                presentations: vec![PresentationPayload {
                    hazard_id: "new-hazard-1".to_string(),
                    hazard_name: "Bear Activity".to_string(),
                    boundary: Some(square),
                    notes: Some(Notes::Many(vec!["a".to_string(), "b".to_string()])),
                    hazard_severity: Some(Severity::High),
                    hazard_type: Some(HazardCategory::Animal),
                }],
            }],
            hazards: vec![HazardPayload {
                id: "new-hazard-1".to_string(),
                name: "Bear Activity".to_string(),
                severity: Some(Severity::High),
                category: Some(HazardCategory::Animal),
                description: None,
            }],
        }
    }

    #[test]
    fn ingest_payload_makes_boundaries_queryable() {
        let mut store = CatalogStore::new();
        let summary = store.ingest_payload(&payload()).unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                locations: 1,
                hazards: 1,
                presentations: 1
            }
        );

        let found = store.hazards_at(Point::new(40.2, -105.8));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hazard.name, "Bear Activity");
        assert_eq!(found[0].presentations[0].notes, "a\nb");
        assert!(store.hazards_at(Point::new(42.0, -105.5)).is_empty());
    }

    #[test]
    fn reingest_replaces_presentations() {
        let mut store = CatalogStore::new();
        store.ingest_payload(&payload()).unwrap();
        store.ingest_payload(&payload()).unwrap();
        assert_eq!(store.presentations().count(), 1);
        assert_eq!(store.search_hazards("bear", None).unwrap().len(), 1);
    }

    #[test]
    fn ingest_rejects_unknown_hazard() {
        let mut output = payload();
        output.hazards.clear();
        let mut store = CatalogStore::new();
        assert!(matches!(
            store.ingest_payload(&output),
            Err(CatalogError::UnknownHazard { .. })
        ));
    }

    #[tokio::test]
    async fn store_serves_as_search_collaborator() {
        let mut store = CatalogStore::new();
        store.ingest_payload(&payload()).unwrap();
        let search: &dyn CatalogSearch = &store;
        let hits = search.search_hazards("bear activity", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_deref(), Some("1"));
        assert_eq!(hits[0].fields["severity"], "high");
    }
}
