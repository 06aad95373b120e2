//! Normalization of heterogeneous boundary encodings.
//!
//! Accepted inputs (see [`BoundaryInput`]):
//!
//! 1. a flat list of point-like values: one polygon;
//! 2. a list of such lists: one polygon per inner list;
//! 3. a GeoJSON-like `Polygon` (first ring only) or `MultiPolygon` (first
//!    ring of each member).
//!
//! Point-like values are `[latitude, longitude]` pairs or objects with
//! latitude/longitude keys. Output rings are left exactly as given (not
//! closed); use [`BoundarySet::closed`] where closure matters.

use elk_geometry_models::{GeoJsonBoundary, PointInput, PolygonCoordinates};

use crate::{BoundaryInput, BoundarySet, BoundingBox, GeometryError, Point, Polygon};

/// Minimum number of vertices a polygon needs after coercion.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Decodes a raw JSON value into a [`BoundaryInput`].
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBoundary`] if the value matches none of
/// the accepted encodings (including GeoJSON objects of other types).
pub fn decode_boundary(raw: &serde_json::Value) -> Result<BoundaryInput, GeometryError> {
    BoundaryInput::from_value(raw).map_err(|e| {
        GeometryError::invalid_boundary(format!("unsupported boundary structure: {e}"))
    })
}

/// Normalizes a decoded boundary into a [`BoundarySet`].
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBoundary`] if the input is empty, a
/// point-like value does not hold numeric coordinates, or any polygon has
/// fewer than [`MIN_POLYGON_POINTS`] points.
pub fn normalize_boundary(input: &BoundaryInput) -> Result<BoundarySet, GeometryError> {
    let rings: Vec<&[PointInput]> = match input {
        BoundaryInput::Polygon(points) => {
            non_empty(points)?;
            vec![points.as_slice()]
        }
        BoundaryInput::Polygons(polygons) => {
            non_empty(polygons)?;
            polygons.iter().map(Vec::as_slice).collect()
        }
        BoundaryInput::GeoJson(GeoJsonBoundary::Polygon { coordinates }) => {
            vec![exterior_ring(coordinates)?]
        }
        BoundaryInput::GeoJson(GeoJsonBoundary::MultiPolygon { coordinates }) => {
            non_empty(coordinates)?;
            coordinates
                .iter()
                .map(exterior_ring)
                .collect::<Result<_, _>>()?
        }
    };

    rings
        .into_iter()
        .map(coerce_polygon)
        .collect::<Result<Vec<_>, _>>()
        .map(BoundarySet)
}

/// Decodes and normalizes a raw JSON boundary in one step.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidBoundary`] under the same conditions as
/// [`decode_boundary`] and [`normalize_boundary`].
pub fn normalize_boundary_value(raw: &serde_json::Value) -> Result<BoundarySet, GeometryError> {
    normalize_boundary(&decode_boundary(raw)?)
}

/// Builds a closed rectangle from a bounding box: northeast, northwest,
/// southwest, southeast, then back to northeast.
#[must_use]
pub fn bounding_box_ring(bounds: &BoundingBox) -> Polygon {
    let ne = bounds.northeast;
    let sw = bounds.southwest;
    Polygon(vec![
        ne,
        Point::new(ne.latitude, sw.longitude),
        sw,
        Point::new(sw.latitude, ne.longitude),
        ne,
    ])
}

fn non_empty<T>(items: &[T]) -> Result<(), GeometryError> {
    if items.is_empty() {
        return Err(GeometryError::invalid_boundary(
            "boundary coordinate list is empty",
        ));
    }
    Ok(())
}

fn exterior_ring(coordinates: &PolygonCoordinates) -> Result<&[PointInput], GeometryError> {
    match coordinates {
        PolygonCoordinates::Ring(points) => {
            non_empty(points)?;
            Ok(points)
        }
        PolygonCoordinates::Rings(rings) => rings.first().map(Vec::as_slice).ok_or_else(|| {
            GeometryError::invalid_boundary("boundary coordinate list is empty")
        }),
    }
}

fn coerce_polygon(points: &[PointInput]) -> Result<Polygon, GeometryError> {
    let polygon = points
        .iter()
        .map(coerce_point)
        .collect::<Result<Vec<_>, _>>()?;

    if polygon.len() < MIN_POLYGON_POINTS {
        return Err(GeometryError::invalid_boundary(format!(
            "boundary polygons require at least {MIN_POLYGON_POINTS} points, got {}",
            polygon.len()
        )));
    }

    Ok(Polygon(polygon))
}

fn coerce_point(raw: &PointInput) -> Result<Point, GeometryError> {
    let (latitude, longitude) = match raw {
        PointInput::Pair(lat, lng) => (lat, lng),
        PointInput::Object {
            latitude,
            longitude,
        } => (latitude, longitude),
    };

    match (latitude.value(), longitude.value()) {
        (Some(lat), Some(lng)) => Ok(Point::new(lat, lng)),
        _ => Err(GeometryError::invalid_boundary(format!(
            "boundary point has non-numeric coordinates: {raw:?}"
        ))),
    }
}
