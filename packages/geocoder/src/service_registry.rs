//! Compile-time registry of enrichment service configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`],
//! [`enabled_services`] and [`find_service`].

use serde::Deserialize;

/// An enrichment service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"google_places"`, `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is picked when none is requested explicitly.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preference order, lower values first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Google Places text search + Geocoding API.
    GooglePlaces(GoogleSettings),
    /// Nominatim / `OpenStreetMap` search.
    Nominatim(NominatimSettings),
}

/// Google Places endpoints and request options.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    /// Text search endpoint.
    pub places_url: String,
    /// Geocoding endpoint used for bounds lookups by place id.
    pub geocode_url: String,
    /// Place photo endpoint.
    pub photo_url: String,
    /// `maxwidth` requested for photos.
    pub photo_max_width: u32,
    /// Result language.
    pub language: String,
    /// Number of concurrent lookups to run.
    #[serde(default = "default_concurrent")]
    pub concurrent_requests: usize,
}

/// Nominatim endpoint and pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimSettings {
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// Maximum results per search.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
}

const fn default_true() -> bool {
    true
}

const fn default_concurrent() -> usize {
    8
}

const fn default_result_limit() -> usize {
    5
}

impl GeocodingService {
    /// Returns the provider's primary URL regardless of variant.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::GooglePlaces(settings) => &settings.places_url,
            ProviderConfig::Nominatim(settings) => &settings.base_url,
        }
    }

    /// How many lookups may be in flight against this service at once.
    #[must_use]
    pub const fn concurrent_requests(&self) -> usize {
        match &self.provider {
            ProviderConfig::GooglePlaces(settings) => settings.concurrent_requests,
            ProviderConfig::Nominatim(_) => 1,
        }
    }
}

const SERVICE_TOMLS: &[(&str, &str)] = &[
    ("google_places", include_str!("../services/google_places.toml")),
    ("nominatim", include_str!("../services/nominatim.toml")),
];

/// Every configured enrichment service, in declaration order.
///
/// # Panics
///
/// Panics if an embedded service file does not parse. The files ship with
/// the crate, so this only fails on a broken build.
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(id, raw)| {
            toml::de::from_str(raw)
                .unwrap_or_else(|e| panic!("Invalid enrichment service file '{id}': {e}"))
        })
        .collect()
}

/// Enabled services, lowest `priority` first.
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut enabled: Vec<GeocodingService> = all_services()
        .into_iter()
        .filter(|service| service.enabled)
        .collect();
    enabled.sort_by_key(|service| service.priority);
    enabled
}

/// Returns the service with the given id, enabled or not.
#[must_use]
pub fn find_service(id: &str) -> Option<GeocodingService> {
    all_services().into_iter().find(|s| s.id == id)
}
