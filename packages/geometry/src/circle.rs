//! Circle approximation and great-circle distance.

use std::f64::consts::PI;

use crate::{EARTH_RADIUS_METERS, GeometryError, Point, Polygon};

/// Default number of vertices used when a caller has no preference.
pub const DEFAULT_SEGMENTS: usize = 32;

/// Generates a regular polygon approximating a circle of `radius_meters`
/// around `center`.
///
/// Vertices are placed at evenly spaced bearings (`2π / segments` apart,
/// starting due north) using the spherical destination-point formula. The
/// ring is returned open: exactly `segments` points, first not repeated.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidArgument`] if `radius_meters` is not
/// positive or `segments` is less than 3.
#[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
pub fn circle_boundary(
    center: Point,
    radius_meters: f64,
    segments: usize,
) -> Result<Polygon, GeometryError> {
    if radius_meters.is_nan() || radius_meters <= 0.0 {
        return Err(GeometryError::invalid_argument(
            "radius must be greater than zero",
        ));
    }
    if segments < 3 {
        return Err(GeometryError::invalid_argument(
            "circle boundary requires at least three segments",
        ));
    }

    let angular_distance = radius_meters / EARTH_RADIUS_METERS;
    let center_lat = center.latitude.to_radians();
    let center_lng = center.longitude.to_radians();

    let points = (0..segments)
        .map(|step| {
            let bearing = 2.0 * PI * step as f64 / segments as f64;
            let lat = (center_lat.sin() * angular_distance.cos()
                + center_lat.cos() * angular_distance.sin() * bearing.cos())
            .asin();
            let lng = center_lng
                + (bearing.sin() * angular_distance.sin() * center_lat.cos())
                    .atan2(angular_distance.cos() - center_lat.sin() * lat.sin());
            Point::new(lat.to_degrees(), lng.to_degrees())
        })
        .collect();

    Ok(Polygon(points))
}

/// Great-circle distance between two points, in meters (haversine).
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn haversine_distance_meters(a: Point, b: Point) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lng = b.longitude.to_radians() - a.longitude.to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Whether `point` lies within `radius_meters` (great-circle) of `center`.
///
/// A non-positive radius always yields `false`; callers use this as a
/// cheap pre-check before polygon tests.
#[must_use]
pub fn point_within_circle(point: Point, center: Point, radius_meters: f64) -> bool {
    if radius_meters.is_nan() || radius_meters <= 0.0 {
        return false;
    }
    haversine_distance_meters(point, center) <= radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_has_requested_vertex_count_at_radius() {
        let center = Point::new(40.34, -105.68);
        for &(radius, segments) in &[(5_000.0, 32), (1.5, 3), (250_000.0, 7)] {
            let polygon = circle_boundary(center, radius, segments).unwrap();
            assert_eq!(polygon.len(), segments);
            for vertex in polygon.points() {
                let distance = haversine_distance_meters(center, *vertex);
                assert!(
                    (distance - radius).abs() <= radius * 1e-6,
                    "vertex {vertex:?} is {distance}m from center, expected {radius}m"
                );
            }
        }
    }

    #[test]
    fn first_vertex_is_due_north() {
        let center = Point::new(0.0, 0.0);
        let polygon = circle_boundary(center, 1_000.0, 4).unwrap();
        let first = polygon.points()[0];
        assert!(first.latitude > 0.0);
        assert!(first.longitude.abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_circle_arguments() {
        let center = Point::new(0.0, 0.0);
        assert!(matches!(
            circle_boundary(center, 0.0, 32),
            Err(GeometryError::InvalidArgument { .. })
        ));
        assert!(matches!(
            circle_boundary(center, -10.0, 32),
            Err(GeometryError::InvalidArgument { .. })
        ));
        assert!(matches!(
            circle_boundary(center, 10.0, 2),
            Err(GeometryError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn center_is_within_any_positive_radius() {
        let center = Point::new(40.34, -105.68);
        assert!(point_within_circle(center, center, 0.001));
        assert!(point_within_circle(center, center, 5_000.0));
    }

    #[test]
    fn non_positive_radius_never_contains() {
        let center = Point::new(40.34, -105.68);
        assert!(!point_within_circle(center, center, 0.0));
        assert!(!point_within_circle(Point::new(1.0, 1.0), center, -5.0));
    }

    #[test]
    fn distance_respects_radius() {
        let center = Point::new(40.34, -105.68);
        let near = Point::new(40.35, -105.68);
        let far = Point::new(38.5, -106.0);
        assert!(point_within_circle(near, center, 5_000.0));
        assert!(!point_within_circle(far, center, 5_000.0));
    }
}
