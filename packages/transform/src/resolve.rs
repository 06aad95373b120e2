//! Catalog resolution.
//!
//! Each aggregated entity's name is searched in the catalog and the best
//! hit above [`RESOLUTION_THRESHOLD`] contributes its id and fills empty
//! fields. Lookups run concurrently; results are applied afterwards in key
//! order. A failed lookup is logged and treated as "no match" for that
//! entity only.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use elk_catalog::{CatalogRecord, CatalogSearch};
use elk_matching::{RESOLUTION_THRESHOLD, best_match};
use futures::{StreamExt as _, stream};
use strum_macros::AsRefStr;

use crate::aggregate::{Aggregate, normalize_name};

/// How many search hits are requested per lookup.
pub const SEARCH_LIMIT: usize = 5;

/// Which catalog collection a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    /// `locations/`
    Location,
    /// `hazards/search/`
    Hazard,
}

type Cache = Mutex<BTreeMap<String, Option<CatalogRecord>>>;

/// Resolves names against a catalog, caching outcomes for one run.
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogSearch>,
    concurrency: usize,
    locations: Cache,
    hazards: Cache,
}

impl CatalogResolver {
    /// Creates a resolver with empty caches.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSearch>, concurrency: usize) -> Self {
        Self {
            catalog,
            concurrency: concurrency.max(1),
            locations: Mutex::default(),
            hazards: Mutex::default(),
        }
    }

    const fn cache(&self, kind: EntityKind) -> &Cache {
        match kind {
            EntityKind::Location => &self.locations,
            EntityKind::Hazard => &self.hazards,
        }
    }

    fn cached(&self, kind: EntityKind, key: &str) -> Option<Option<CatalogRecord>> {
        self.cache(kind)
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remember(&self, kind: EntityKind, key: String, record: Option<CatalogRecord>) {
        self.cache(kind)
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key, record);
    }

    /// Finds the catalog record best matching `name`.
    ///
    /// Outcomes, including "no match" and failures, are cached by
    /// normalized name for the lifetime of the resolver.
    pub async fn find(&self, kind: EntityKind, name: &str) -> Option<CatalogRecord> {
        let key = normalize_name(name);
        if let Some(hit) = self.cached(kind, &key) {
            return hit;
        }

        let result = match kind {
            EntityKind::Location => self.catalog.search_locations(name, SEARCH_LIMIT).await,
            EntityKind::Hazard => self.catalog.search_hazards(name, SEARCH_LIMIT).await,
        };

        let record = match result {
            Ok(records) => best_match(records, name, RESOLUTION_THRESHOLD),
            Err(e) => {
                log::warn!("{} search failed for '{name}': {e}", kind.as_ref());
                None
            }
        };

        match &record {
            Some(r) => log::debug!(
                "Resolved {} '{name}' to '{}' ({})",
                kind.as_ref(),
                r.name,
                r.id.as_deref().unwrap_or("no id")
            ),
            None => log::debug!("No catalog match for {} '{name}'", kind.as_ref()),
        }

        self.remember(kind, key, record.clone());
        record
    }

    async fn find_all(
        &self,
        kind: EntityKind,
        names: Vec<(String, String)>,
    ) -> Vec<(String, Option<CatalogRecord>)> {
        stream::iter(names.into_iter().map(|(key, name)| async move {
            let record = self.find(kind, &name).await;
            (key, record)
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await
    }

    /// Resolves every location and hazard in `aggregate`.
    pub async fn resolve(&self, aggregate: &mut Aggregate) {
        let locations = aggregate
            .locations
            .iter()
            .map(|(key, entry)| (key.clone(), entry.name.clone()))
            .collect();
        let hazards = aggregate
            .hazards
            .iter()
            .map(|(key, entry)| (key.clone(), entry.name.clone()))
            .collect();

        let mut location_matches = self.find_all(EntityKind::Location, locations).await;
        let mut hazard_matches = self.find_all(EntityKind::Hazard, hazards).await;
        location_matches.sort_by(|a, b| a.0.cmp(&b.0));
        hazard_matches.sort_by(|a, b| a.0.cmp(&b.0));

        let mut resolved = 0usize;
        for (key, record) in location_matches {
            if let Some(record) = record
                && let Some(entry) = aggregate.locations.get_mut(&key)
            {
                entry.merge_record(&record);
                resolved += 1;
            }
        }
        for (key, record) in hazard_matches {
            if let Some(record) = record
                && let Some(entry) = aggregate.hazards.get_mut(&key)
            {
                entry.merge_record(&record);
                resolved += 1;
            }
        }

        log::info!(
            "Resolved {resolved} of {} entities against the catalog",
            aggregate.locations.len() + aggregate.hazards.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use elk_catalog::{CatalogError, parse_records};
    use serde_json::json;

    use super::*;

    /// Serves fixed search results and counts calls.
    struct StubCatalog {
        locations: serde_json::Value,
        hazards: serde_json::Value,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubCatalog {
        fn new(locations: serde_json::Value, hazards: serde_json::Value) -> Self {
            Self {
                locations,
                hazards,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl CatalogSearch for StubCatalog {
        async fn search_locations(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<CatalogRecord>, CatalogError> {
            assert_eq!(limit, SEARCH_LIMIT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CatalogError::Status {
                    status: 503,
                    url: "http://catalog/locations/".to_string(),
                });
            }
            Ok(parse_records(&self.locations))
        }

        async fn search_hazards(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<CatalogRecord>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(parse_records(&self.hazards))
        }
    }

    #[tokio::test]
    async fn picks_best_match_above_threshold() {
        let catalog = Arc::new(StubCatalog::new(
            json!([
                {"id": 1, "name": "Yosemite National Park"},
                {"id": 42, "name": "Rocky Park"}
            ]),
            json!([]),
        ));
        let resolver = CatalogResolver::new(catalog, 4);

        let hit = resolver.find(EntityKind::Location, "rocky park").await.unwrap();
        assert_eq!(hit.id.as_deref(), Some("42"));
        assert!(resolver.find(EntityKind::Location, "Grand Canyon").await.is_none());
    }

    #[tokio::test]
    async fn outcomes_are_cached_by_normalized_name() {
        let catalog = Arc::new(StubCatalog::new(json!([{"id": 42, "name": "Rocky Park"}]), json!([])));
        let resolver = CatalogResolver::new(catalog.clone(), 4);

        resolver.find(EntityKind::Location, "Rocky Park").await;
        resolver.find(EntityKind::Location, "  rocky park ").await;
        resolver.find(EntityKind::Location, "Nowhere").await;
        resolver.find(EntityKind::Location, "NOWHERE").await;
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);

        resolver.find(EntityKind::Hazard, "Rocky Park").await;
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failures_degrade_to_no_match() {
        let catalog = Arc::new(StubCatalog {
            fail: true,
            ..StubCatalog::new(json!([]), json!([{"id": "7", "name": "Bear Activity"}]))
        });
        let resolver = CatalogResolver::new(catalog.clone(), 2);

        assert!(resolver.find(EntityKind::Location, "Rocky Park").await.is_none());
        assert!(resolver.find(EntityKind::Location, "Rocky Park").await.is_none());
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
        assert!(resolver.find(EntityKind::Hazard, "Bear Activity").await.is_some());
    }
}
