#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry engine for hazard presentations and locations.
//!
//! Pure functions over [`Point`]s and [`Polygon`]s:
//!
//! - [`circle::circle_boundary`] approximates a circle of a given radius
//!   with a regular polygon, and [`circle::point_within_circle`] answers
//!   great-circle (haversine) containment.
//! - [`boundary::normalize_boundary`] turns any accepted boundary encoding
//!   into a canonical [`BoundarySet`].
//! - [`contains::point_within_boundary`] and
//!   [`contains::point_in_polygon`] answer ray-casting containment.
//!
//! Nothing here holds state, so every function is safe to call from any
//! number of workers at once.

pub mod boundary;
pub mod circle;
pub mod contains;

pub use boundary::{bounding_box_ring, decode_boundary, normalize_boundary, normalize_boundary_value};
pub use circle::{circle_boundary, haversine_distance_meters, point_within_circle};
pub use contains::{point_in_polygon, point_within_boundary};
pub use elk_geometry_models::{BoundaryInput, BoundarySet, BoundingBox, Point, Polygon};

use thiserror::Error;

/// Mean Earth radius used for all spherical computations, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Errors raised to direct callers of the geometry engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A numeric parameter (radius, segment count) is out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected parameter.
        message: String,
    },

    /// Boundary input is malformed or under-specified.
    #[error("Invalid boundary: {message}")]
    InvalidBoundary {
        /// Description of what is wrong with the boundary.
        message: String,
    },
}

impl GeometryError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_boundary(message: impl Into<String>) -> Self {
        Self::InvalidBoundary {
            message: message.into(),
        }
    }
}
