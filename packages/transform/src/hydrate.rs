//! Location enrichment.
//!
//! Locations still missing coordinates, a boundary, an image or a place id
//! are looked up by name with the configured [`PlaceLookup`]. The best
//! candidate above [`RESOLUTION_THRESHOLD`] fills the missing fields only.
//!
//! Boundary sources, in order: the candidate's polygon outline, the
//! candidate's bounding box, then a secondary bounds lookup by place id.
//! Bounding boxes become closed NE, NW, SW, SE, NE rectangles.

use std::sync::Arc;

use elk_geocoder::{PlaceCandidate, PlaceLookup};
use elk_geometry::{BoundarySet, bounding_box_ring};
use elk_matching::{RESOLUTION_THRESHOLD, best_match};
use futures::{StreamExt as _, stream};

use crate::aggregate::Aggregate;

/// What a lookup found for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// The selected candidate.
    pub candidate: PlaceCandidate,
    /// Boundary derived for the location; empty when none was found or
    /// none was needed.
    pub boundary: BoundarySet,
}

/// Fills missing location data from a place service.
pub struct Hydrator {
    lookup: Arc<dyn PlaceLookup>,
    concurrency: usize,
}

impl Hydrator {
    /// Creates a hydrator running at most `concurrency` lookups at once.
    #[must_use]
    pub fn new(lookup: Arc<dyn PlaceLookup>, concurrency: usize) -> Self {
        Self {
            lookup,
            concurrency: concurrency.max(1),
        }
    }

    /// Looks up `name` and derives a boundary if `needs_boundary`.
    ///
    /// Returns `None` when the lookup fails or no candidate matches well
    /// enough. A failed bounds lookup only loses the boundary.
    pub async fn enrich(&self, name: &str, needs_boundary: bool) -> Option<Enrichment> {
        let candidates = match self.lookup.search(name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Place search failed for '{name}': {e}");
                return None;
            }
        };

        let Some(candidate) = best_match(candidates, name, RESOLUTION_THRESHOLD) else {
            log::debug!("No place candidate for '{name}'");
            return None;
        };

        let boundary = if needs_boundary {
            self.boundary_for(name, &candidate).await
        } else {
            BoundarySet::empty()
        };

        Some(Enrichment {
            candidate,
            boundary,
        })
    }

    async fn boundary_for(&self, name: &str, candidate: &PlaceCandidate) -> BoundarySet {
        if let Some(outline) = candidate.boundary.as_ref().filter(|b| !b.is_empty()) {
            return outline.clone();
        }
        if let Some(bounds) = &candidate.bounds {
            return BoundarySet::from(bounding_box_ring(bounds));
        }
        let Some(place_id) = &candidate.place_id else {
            return BoundarySet::empty();
        };

        match self.lookup.bounds(place_id).await {
            Ok(Some(bounds)) => BoundarySet::from(bounding_box_ring(&bounds)),
            Ok(None) => BoundarySet::empty(),
            Err(e) => {
                log::warn!("Bounds lookup failed for '{name}': {e}");
                BoundarySet::empty()
            }
        }
    }

    /// Enriches every location in `aggregate` that is missing data.
    pub async fn hydrate(&self, aggregate: &mut Aggregate) {
        let pending: Vec<(String, String, bool)> = aggregate
            .locations
            .iter()
            .filter(|(_, entry)| entry.needs_enrichment())
            .map(|(key, entry)| (key.clone(), entry.name.clone(), entry.boundary.is_empty()))
            .collect();

        if pending.is_empty() {
            return;
        }
        log::info!(
            "Enriching {} location(s) (concurrency={})",
            pending.len(),
            self.concurrency
        );

        let mut results: Vec<(String, Option<Enrichment>)> =
            stream::iter(pending.into_iter().map(|(key, name, needs_boundary)| async move {
                let enrichment = self.enrich(&name, needs_boundary).await;
                (key, enrichment)
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, enrichment) in results {
            if let Some(enrichment) = enrichment
                && let Some(entry) = aggregate.locations.get_mut(&key)
            {
                let Enrichment {
                    candidate,
                    boundary,
                } = enrichment;
                entry.fill_coordinates(candidate.location);
                entry.fill_enrichment(candidate.image, candidate.place_id, &boundary);
            }
        }
    }
}
