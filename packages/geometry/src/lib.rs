#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry utilities shared by the normalizer, spatial joins and exporter.
//!
//! * [`containment`]: boundary-inclusive point-in-polygon tests and the
//!   borough lookup (linear and R-tree backed).
//! * [`nearest`]: nearest reference feature by great-circle distance.
//! * [`centroid`]: reduction of footprint geometries to a single point.
//! * [`precision`]: coordinate rounding applied at every export boundary.

pub mod centroid;
pub mod containment;
pub mod nearest;
pub mod precision;

pub use centroid::centroid;
pub use containment::{BoroughIndex, BoroughPolygon, borough_for_point, point_in_polygon};
pub use nearest::{great_circle_km, nearest_feature};
pub use precision::{COORDINATE_PRECISION, round_coordinates, round_geometry_value};

/// Errors that can occur while loading reference geometries.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document was valid JSON but not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` had an unexpected shape.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
