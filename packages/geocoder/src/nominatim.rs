//! Nominatim / OpenStreetMap enrichment client.
//!
//! Free-form search with `polygon_geojson=1`, so results carry the place
//! outline directly along with a `boundingbox`. Nominatim has strict rate
//! limits: **1 request per second** maximum on the public instance, which
//! the client enforces itself (see `rate_limit_ms` in the service TOML
//! configuration).
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::{Duration, Instant};

use async_trait::async_trait;
use elk_geometry::{BoundarySet, BoundingBox, Point, Polygon, boundary::MIN_POLYGON_POINTS};
use tokio::sync::Mutex;

use crate::{
    GeocodeError, PlaceCandidate, PlaceLookup, number, service_registry::NominatimSettings,
};

/// Nominatim client.
#[derive(Debug)]
pub struct Nominatim {
    client: reqwest::Client,
    settings: NominatimSettings,
    last_request: Mutex<Option<Instant>>,
}

impl Nominatim {
    /// Creates a client for the configured endpoint.
    #[must_use]
    pub fn new(client: reqwest::Client, settings: NominatimSettings) -> Self {
        Self {
            client,
            settings,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until at least `rate_limit_ms` has passed since the previous
    /// request.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let wait = Duration::from_millis(self.settings.rate_limit_ms)
                .saturating_sub(previous.elapsed());
            if !wait.is_zero() {
                log::trace!("Nominatim rate limit: waiting {}ms", wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl PlaceLookup for Nominatim {
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodeError> {
        self.pace().await;

        let limit = self.settings.result_limit.to_string();
        let resp = self
            .client
            .get(&self.settings.base_url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("polygon_geojson", "1"),
                ("limit", limit.as_str()),
            ])
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
        parse_response(&body)
    }
}

/// Parses a Nominatim search response.
fn parse_response(body: &serde_json::Value) -> Result<Vec<PlaceCandidate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    Ok(results.iter().filter_map(parse_place).collect())
}

fn parse_place(place: &serde_json::Value) -> Option<PlaceCandidate> {
    let name = place["name"]
        .as_str()
        .or_else(|| place["display_name"].as_str())
        .map(str::trim)
        .filter(|n| !n.is_empty())?;

    let location = number(&place["lat"])
        .zip(number(&place["lon"]))
        .map(|(lat, lng)| Point::new(lat, lng));

    Some(PlaceCandidate {
        name: name.to_string(),
        location,
        place_id: None,
        image: None,
        boundary: parse_outline(&place["geojson"]),
        bounds: parse_bounding_box(&place["boundingbox"]),
    })
}

/// `boundingbox` is `[south, north, west, east]` as strings.
fn parse_bounding_box(value: &serde_json::Value) -> Option<BoundingBox> {
    let values: Vec<f64> = value.as_array()?.iter().map(number).collect::<Option<_>>()?;
    let [south, north, west, east] = values.as_slice() else {
        return None;
    };
    Some(BoundingBox {
        northeast: Point::new(*north, *east),
        southwest: Point::new(*south, *west),
    })
}

/// Reads the outer ring of each polygon in a GeoJSON geometry.
///
/// GeoJSON positions are `[longitude, latitude]`. Non-polygon geometries
/// (points for small places, lines for roads) have no outline, and rings
/// with fewer than three distinct points are dropped.
fn parse_outline(value: &serde_json::Value) -> Option<BoundarySet> {
    let geometry: geojson::Geometry = serde_json::from_value(value.clone()).ok()?;
    let polygons = match geo::Geometry::<f64>::try_from(geometry).ok()? {
        geo::Geometry::Polygon(p) => vec![p],
        geo::Geometry::MultiPolygon(mp) => mp.0,
        _ => return None,
    };

    let rings: Vec<Polygon> = polygons
        .iter()
        .map(geo::Polygon::exterior)
        // Exterior rings come back closed: distinct points plus the first
        // repeated.
        .filter(|ring| ring.0.len() > MIN_POLYGON_POINTS)
        .map(|ring| Polygon(ring.coords().map(|c| Point::new(c.y, c.x)).collect()))
        .collect();

    (!rings.is_empty()).then_some(BoundarySet(rings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "place_id": 2345,
            "lat": "40.3557",
            "lon": "-105.6973",
            "name": "Rocky Mountain National Park",
            "display_name": "Rocky Mountain National Park, Larimer County, Colorado, United States",
            "boundingbox": ["40.1579", "40.5535", "-105.9137", "-105.4938"],
            "geojson": {
                "type": "Polygon",
                "coordinates": [[
                    [-105.9, 40.2], [-105.5, 40.2], [-105.5, 40.5], [-105.9, 40.5], [-105.9, 40.2]
                ]]
            }
        }]);
        let results = parse_response(&body).unwrap();
        assert_eq!(results.len(), 1);

        let park = &results[0];
        assert_eq!(park.name, "Rocky Mountain National Park");
        assert!(park.place_id.is_none());
        let location = park.location.unwrap();
        assert!((location.latitude - 40.3557).abs() < 1e-4);
        assert!((location.longitude - -105.6973).abs() < 1e-4);

        let bounds = park.bounds.unwrap();
        assert_eq!(bounds.northeast, Point::new(40.5535, -105.4938));
        assert_eq!(bounds.southwest, Point::new(40.1579, -105.9137));

        let outline = park.boundary.as_ref().unwrap();
        assert_eq!(outline.polygons().len(), 1);
        assert_eq!(outline.polygons()[0].points()[0], Point::new(40.2, -105.9));
    }

    #[test]
    fn multipolygon_takes_each_outer_ring() {
        let geojson = serde_json::json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]],
                [[[5.0, 5.0], [6.0, 5.0]]],
                [[[10.0, 10.0], [11.0, 10.0], [11.0, 11.0]], [[10.2, 10.2], [10.4, 10.2], [10.4, 10.4]]]
            ]
        });
        let outline = parse_outline(&geojson).unwrap();
        assert_eq!(outline.polygons().len(), 2);
        let ring = outline.polygons()[1].points();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], Point::new(10.0, 10.0));
        assert_eq!(ring[1], Point::new(10.0, 11.0));
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn polygon_holes_are_ignored() {
        let geojson = serde_json::json!({
            "type": "Polygon",
            "coordinates": [
                [[-106.0, 40.0], [-105.0, 40.0], [-105.0, 41.0], [-106.0, 41.0], [-106.0, 40.0]],
                [[-105.6, 40.4], [-105.4, 40.4], [-105.4, 40.6], [-105.6, 40.4]]
            ]
        });
        let outline = parse_outline(&geojson).unwrap();
        assert_eq!(outline.polygons().len(), 1);
        assert_eq!(outline.polygons()[0].len(), 5);
        assert_eq!(outline.polygons()[0].points()[2], Point::new(41.0, -105.0));
    }

    #[test]
    fn points_have_no_outline() {
        let geojson = serde_json::json!({"type": "Point", "coordinates": [-105.6, 40.3]});
        assert!(parse_outline(&geojson).is_none());
        assert!(parse_outline(&serde_json::Value::Null).is_none());
        assert!(parse_outline(&serde_json::json!({"type": "Polygon"})).is_none());
    }

    #[test]
    fn display_name_used_when_name_missing() {
        let body = serde_json::json!([{"display_name": "Estes Park, Colorado", "boundingbox": ["1", "2"]}]);
        let results = parse_response(&body).unwrap();
        assert_eq!(results[0].name, "Estes Park, Colorado");
        assert!(results[0].bounds.is_none());
        assert!(results[0].location.is_none());
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_empty());
        assert!(parse_response(&serde_json::json!({"error": "bad"})).is_err());
    }
}
