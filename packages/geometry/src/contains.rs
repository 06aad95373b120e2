//! Ray-casting containment tests.
//!
//! Points exactly on an edge or shared vertex are reported inside or
//! outside depending on floating-point ray alignment; no attempt is made
//! to resolve that case.

use crate::{BoundarySet, Point, Polygon};

/// Added to each edge's latitude span so horizontal edges never divide by
/// zero.
const EDGE_EPSILON: f64 = 1e-12;

/// Whether `point` lies inside any polygon of `boundary`.
///
/// Polygons are tested independently; overlapping or adjacent polygons
/// are not merged.
#[must_use]
pub fn point_within_boundary(boundary: &BoundarySet, point: Point) -> bool {
    boundary
        .polygons()
        .iter()
        .any(|polygon| point_in_polygon(polygon, point))
}

/// Ray-casting parity test with a horizontal ray cast from `point`
/// towards increasing longitude.
///
/// Edges are half-open in latitude (`(yi > y) != (yj > y)`) so a vertex
/// shared by two edges is counted once. Works on open or closed rings.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn point_in_polygon(polygon: &Polygon, point: Point) -> bool {
    let vertices = polygon.points();
    if vertices.is_empty() {
        return false;
    }

    let x = point.longitude;
    let y = point.latitude;
    let mut inside = false;

    for (i, current) in vertices.iter().enumerate() {
        let previous = if i == 0 {
            &vertices[vertices.len() - 1]
        } else {
            &vertices[i - 1]
        };
        let (xi, yi) = (current.longitude, current.latitude);
        let (xj, yj) = (previous.longitude, previous.latitude);

        if (yi > y) != (yj > y) {
            let slope = (xj - xi) / (yj - yi + EDGE_EPSILON);
            let intersect_x = slope * (y - yi) + xi;
            if intersect_x > x {
                inside = !inside;
            }
        }
    }

    inside
}
