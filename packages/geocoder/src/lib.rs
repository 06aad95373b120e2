#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place enrichment for hazard locations.
//!
//! Looks up a location by name in an external place service and returns
//! candidate places with whatever geography the service knows: a
//! representative coordinate, a stable place id, a photo, a polygon
//! outline, or a bounding box. Providers are configured via TOML files in
//! `services/`:
//!
//! 1. **Google Places** (priority 1): text search plus a secondary
//!    geocode lookup by place id for bounds. Requires an API key.
//! 2. **Nominatim / OpenStreetMap** (priority 2): free-form search that
//!    returns polygon outlines directly. 1 req/sec rate limit.
//!
//! Callers pick a provider from the [`service_registry`] and build it
//! with [`build_lookup`].

pub mod google;
pub mod nominatim;
pub mod service_registry;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use elk_geometry::{BoundarySet, BoundingBox, Point};
use elk_matching::Named;
use thiserror::Error;

use crate::service_registry::{GeocodingService, ProviderConfig};

/// A place returned by an enrichment provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceCandidate {
    /// Display name.
    pub name: String,
    /// Representative coordinate.
    pub location: Option<Point>,
    /// Stable place identifier (Google place id).
    pub place_id: Option<String>,
    /// Photo URL.
    pub image: Option<String>,
    /// Polygon outline, when the provider has one.
    pub boundary: Option<BoundarySet>,
    /// Bounding box, when the provider has one.
    pub bounds: Option<BoundingBox>,
}

impl Named for PlaceCandidate {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A text-query place service.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Searches for places matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodeError>;

    /// Looks up the bounding box of a place by its identifier.
    ///
    /// Providers without a secondary lookup return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn bounds(&self, place_id: &str) -> Result<Option<BoundingBox>, GeocodeError> {
        let _ = place_id;
        Ok(None)
    }
}

/// Errors from enrichment operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("Service returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The service answered with an error status in its body.
    #[error("Service returned {status}")]
    Api {
        /// Service-specific status string (e.g. `REQUEST_DENIED`).
        status: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The selected service needs an API key and none was given.
    #[error("Service '{service}' requires an API key")]
    MissingApiKey {
        /// Service id.
        service: String,
    },
}

/// Builds the lookup client for a configured service.
///
/// # Errors
///
/// Returns [`GeocodeError::MissingApiKey`] if the service needs a key and
/// `api_key` is empty, or [`GeocodeError::Http`] if the HTTP client
/// cannot be built.
pub fn build_lookup(
    service: &GeocodingService,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn PlaceLookup>, GeocodeError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("elk_geocoder/", env!("CARGO_PKG_VERSION")))
        .build()?;

    match &service.provider {
        ProviderConfig::GooglePlaces(settings) => {
            let key = api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| GeocodeError::MissingApiKey {
                    service: service.id.clone(),
                })?;
            Ok(Arc::new(google::GooglePlaces::new(
                client,
                settings.clone(),
                key.to_string(),
            )))
        }
        ProviderConfig::Nominatim(settings) => Ok(Arc::new(nominatim::Nominatim::new(
            client,
            settings.clone(),
        ))),
    }
}

/// Reads a finite coordinate that may be a JSON number or a numeric
/// string.
pub(crate) fn number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_numbers_and_numeric_strings() {
        assert_eq!(number(&serde_json::json!(40.5)), Some(40.5));
        assert_eq!(number(&serde_json::json!(" -105.25 ")), Some(-105.25));
        assert_eq!(number(&serde_json::json!("north")), None);
        assert_eq!(number(&serde_json::Value::Null), None);
        assert_eq!(number(&serde_json::json!("NaN")), None);
        assert_eq!(number(&serde_json::json!("-inf")), None);
    }

    #[test]
    fn google_requires_api_key() {
        let service = service_registry::find_service("google_places").unwrap();
        let result = build_lookup(&service, Some("  "), Duration::from_secs(5));
        assert!(matches!(result, Err(GeocodeError::MissingApiKey { .. })));
        assert!(build_lookup(&service, Some("key"), Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn nominatim_needs_no_key() {
        let service = service_registry::find_service("nominatim").unwrap();
        assert!(build_lookup(&service, None, Duration::from_secs(5)).is_ok());
    }
}
