//! Google Places enrichment client.
//!
//! Text search finds candidate places by name; a Geocoding API lookup by
//! place id returns the place's `bounds` (or its `viewport` when the place
//! has no bounds). Photos are exposed as Place Photo URLs carrying the API
//! key.
//!
//! See <https://developers.google.com/maps/documentation/places/web-service/search-text>

use async_trait::async_trait;
use elk_geometry::{BoundingBox, Point};

use crate::{
    GeocodeError, PlaceCandidate, PlaceLookup, number, service_registry::GoogleSettings,
};

/// Google Places client.
#[derive(Debug, Clone)]
pub struct GooglePlaces {
    client: reqwest::Client,
    settings: GoogleSettings,
    api_key: String,
}

impl GooglePlaces {
    /// Creates a client using the given endpoints and API key.
    #[must_use]
    pub const fn new(client: reqwest::Client, settings: GoogleSettings, api_key: String) -> Self {
        Self {
            client,
            settings,
            api_key,
        }
    }

    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GeocodeError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        check_status(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl PlaceLookup for GooglePlaces {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        let body = self
            .get_json(
                &self.settings.places_url,
                &[("query", query), ("language", self.settings.language.as_str())],
            )
            .await?;
        Ok(parse_text_search(&body, |reference| {
            photo_url(&self.settings, &self.api_key, reference)
        }))
    }

    async fn bounds(&self, place_id: &str) -> Result<Option<BoundingBox>, GeocodeError> {
        let body = self
            .get_json(&self.settings.geocode_url, &[("place_id", place_id)])
            .await?;
        Ok(parse_geocode_bounds(&body))
    }
}

fn photo_url(settings: &GoogleSettings, api_key: &str, reference: &str) -> String {
    format!(
        "{}?maxwidth={}&photo_reference={reference}&key={api_key}",
        settings.photo_url, settings.photo_max_width
    )
}

/// Maps the body-level `status` field to an error. `OK`, `ZERO_RESULTS`
/// and a missing status pass.
fn check_status(body: &serde_json::Value) -> Result<(), GeocodeError> {
    match body["status"].as_str() {
        None | Some("OK" | "ZERO_RESULTS") => Ok(()),
        Some("OVER_QUERY_LIMIT") => Err(GeocodeError::RateLimited),
        Some(other) => Err(GeocodeError::Api {
            status: other.to_string(),
        }),
    }
}

/// Parses a text search response. Results without a name are skipped.
fn parse_text_search(
    body: &serde_json::Value,
    photo: impl Fn(&str) -> String,
) -> Vec<PlaceCandidate> {
    let Some(results) = body["results"].as_array() else {
        return Vec::new();
    };

    results
        .iter()
        .filter_map(|result| {
            let name = result["name"].as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let location = &result["geometry"]["location"];
            let location = number(&location["lat"])
                .zip(number(&location["lng"]))
                .map(|(lat, lng)| Point::new(lat, lng));
            let place_id = result["place_id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map(String::from);
            let image = result["photos"][0]["photo_reference"]
                .as_str()
                .filter(|r| !r.is_empty())
                .map(&photo);

            Some(PlaceCandidate {
                name: name.to_string(),
                location,
                place_id,
                image,
                boundary: None,
                bounds: None,
            })
        })
        .collect()
}

/// Parses a geocode-by-place-id response: the first result with usable
/// `bounds`, else usable `viewport`.
fn parse_geocode_bounds(body: &serde_json::Value) -> Option<BoundingBox> {
    body["results"].as_array()?.iter().find_map(|result| {
        let geometry = &result["geometry"];
        parse_bounds(&geometry["bounds"]).or_else(|| parse_bounds(&geometry["viewport"]))
    })
}

fn parse_bounds(value: &serde_json::Value) -> Option<BoundingBox> {
    let corner = |key: &str| {
        let corner = &value[key];
        number(&corner["lat"])
            .zip(number(&corner["lng"]))
            .map(|(lat, lng)| Point::new(lat, lng))
    };
    Some(BoundingBox {
        northeast: corner("northeast")?,
        southwest: corner("southwest")?,
    })
}
