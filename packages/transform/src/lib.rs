#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Consolidation of hazard extraction documents.
//!
//! A run takes every extraction document produced upstream and emits one
//! canonical payload:
//!
//! 1. **Ingest**: fragments are merged by normalized name, first value
//!    wins ([`aggregate`]).
//! 2. **Resolve**: names are matched against the catalog to pick up
//!    existing ids ([`resolve`]).
//! 3. **Hydrate**: locations missing geography are enriched from a place
//!    service ([`hydrate`]).
//! 4. **Assign & Emit**: remaining entities get deterministic synthetic
//!    ids and the payload is rendered ([`emit`]).
//!
//! Resolve and Hydrate are optional and best-effort; without them the
//! output depends only on the documents.

pub mod aggregate;
pub mod document;
pub mod emit;
pub mod hydrate;
pub mod resolve;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use elk_catalog::CatalogSearch;
use elk_geocoder::{
    PlaceLookup,
    service_registry::{self, GeocodingService, ProviderConfig},
};
use elk_transform_models::TransformOutput;
use thiserror::Error;

use crate::{
    aggregate::Aggregate, document::Document, hydrate::Hydrator, resolve::CatalogResolver,
};

/// Default number of concurrent collaborator lookups.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Errors from a transformation run.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The top-level input was not a list of documents.
    #[error("Expected a list of documents, got {found}")]
    NotIterable {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// Reading documents or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested enrichment service does not exist.
    #[error("Unknown enrichment service: {id}")]
    UnknownService {
        /// Requested service id.
        id: String,
    },
}

/// Runs the consolidation pipeline.
#[derive(Default)]
pub struct Transformer {
    catalog: Option<(Arc<dyn CatalogSearch>, usize)>,
    enrichment: Option<(Arc<dyn PlaceLookup>, usize)>,
}

impl Transformer {
    /// Creates a transformer with no collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves entities against `catalog` with up to `concurrency`
    /// searches in flight.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogSearch>, concurrency: usize) -> Self {
        self.catalog = Some((catalog, concurrency));
        self
    }

    /// Enriches locations through `lookup` with up to `concurrency`
    /// lookups in flight.
    #[must_use]
    pub fn with_enrichment(mut self, lookup: Arc<dyn PlaceLookup>, concurrency: usize) -> Self {
        self.enrichment = Some((lookup, concurrency));
        self
    }

    /// Transforms a JSON array of documents.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NotIterable`] if `documents` is not an
    /// array. Nothing else is fatal: non-object documents and malformed
    /// fragments are skipped.
    pub async fn transform_value(
        &self,
        documents: &serde_json::Value,
    ) -> Result<TransformOutput, TransformError> {
        let Some(documents) = documents.as_array() else {
            return Err(TransformError::NotIterable {
                found: json_type(documents),
            });
        };
        Ok(self.transform_documents(documents).await)
    }

    /// Transforms documents in order.
    pub async fn transform_documents<'a>(
        &self,
        documents: impl IntoIterator<Item = &'a serde_json::Value>,
    ) -> TransformOutput {
        let mut aggregate = Aggregate::new();
        let mut count = 0usize;
        for (index, value) in documents.into_iter().enumerate() {
            match Document::from_value(value) {
                Some(document) => {
                    aggregate.ingest(&document);
                    count += 1;
                }
                None => log::warn!("Skipping document {index}: not a JSON object"),
            }
        }
        log::info!(
            "Ingested {count} document(s): {} location(s), {} hazard(s)",
            aggregate.locations.len(),
            aggregate.hazards.len()
        );

        if let Some((catalog, concurrency)) = &self.catalog {
            CatalogResolver::new(Arc::clone(catalog), *concurrency)
                .resolve(&mut aggregate)
                .await;
        }

        if let Some((lookup, concurrency)) = &self.enrichment {
            Hydrator::new(Arc::clone(lookup), *concurrency)
                .hydrate(&mut aggregate)
                .await;
        }

        emit::assign_ids(&mut aggregate);
        emit::build_output(&aggregate)
    }
}

const fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Reads every `*.json` file in `dir`, in path order.
///
/// A missing directory yields no documents. Files that cannot be read or
/// parsed, or that do not hold a JSON object, are logged and skipped.
///
/// # Errors
///
/// Returns [`TransformError::Io`] if the directory exists but cannot be
/// listed.
pub fn load_documents(dir: &Path) -> Result<Vec<serde_json::Value>, TransformError> {
    if !dir.exists() {
        log::warn!("Input directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                continue;
            }
        };
        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value) if value.is_object() => documents.push(value),
            Ok(_) => log::warn!("Ignoring non-object JSON in {}", path.display()),
            Err(e) => log::error!("Failed to decode JSON from {}: {e}", path.display()),
        }
    }
    Ok(documents)
}

/// Writes `output` as pretty-printed JSON to `<dir>/<timestamp>.json`,
/// creating `dir` if needed, and returns the path written.
///
/// # Errors
///
/// Returns [`TransformError`] if serialization or any filesystem step
/// fails.
pub fn write_output(
    dir: &Path,
    output: &TransformOutput,
    now: DateTime<Utc>,
) -> Result<PathBuf, TransformError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", now.format("%Y%m%dT%H%M%SZ")));
    fs::write(&path, serde_json::to_string_pretty(output)?)?;
    Ok(path)
}

/// Picks the enrichment service for a run.
///
/// An explicitly requested service is returned as long as it exists.
/// Otherwise the first enabled service that can run with the given key
/// is used, or none.
///
/// # Errors
///
/// Returns [`TransformError::UnknownService`] if `requested` names no
/// configured service.
pub fn select_enrichment_service(
    requested: Option<&str>,
    api_key: Option<&str>,
) -> Result<Option<GeocodingService>, TransformError> {
    if let Some(id) = requested {
        return service_registry::find_service(id)
            .map(Some)
            .ok_or_else(|| TransformError::UnknownService { id: id.to_string() });
    }

    let has_key = api_key.is_some_and(|k| !k.trim().is_empty());
    Ok(service_registry::enabled_services()
        .into_iter()
        .find(|service| match service.provider {
            ProviderConfig::GooglePlaces(_) => has_key,
            ProviderConfig::Nominatim(_) => true,
        }))
}
