//! Coordinate precision control.
//!
//! Six decimal digits is roughly 11 cm at NYC latitudes. Every export
//! boundary rounds to [`COORDINATE_PRECISION`] so outputs stay compact and
//! byte-for-byte reproducible.

use serde_json::Value;

/// Decimal digits kept on every exported ordinate.
pub const COORDINATE_PRECISION: i32 = 6;

/// Rounds a single ordinate to `precision` decimal digits.
///
/// Non-finite values are returned unchanged.
#[must_use]
pub fn round_ordinate(value: f64, precision: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// Recursively rounds every number in a nested JSON coordinate array.
///
/// Works on `Point`, `LineString`, `Polygon` and `MultiPolygon` shaped
/// arrays alike; nesting depth and element counts are preserved and
/// non-numeric elements are copied as-is.
#[must_use]
pub fn round_coordinates(coords: &Value, precision: i32) -> Value {
    match coords {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| round_coordinates(item, precision))
                .collect(),
        ),
        Value::Number(n) => n
            .as_f64()
            .and_then(|f| serde_json::Number::from_f64(round_ordinate(f, precision)))
            .map_or_else(|| coords.clone(), Value::Number),
        other => other.clone(),
    }
}

fn round_position(position: &[f64], precision: i32) -> Vec<f64> {
    position
        .iter()
        .map(|&v| round_ordinate(v, precision))
        .collect()
}

fn round_ring(ring: &[Vec<f64>], precision: i32) -> Vec<Vec<f64>> {
    ring.iter().map(|p| round_position(p, precision)).collect()
}

fn round_rings(rings: &[Vec<Vec<f64>>], precision: i32) -> Vec<Vec<Vec<f64>>> {
    rings.iter().map(|r| round_ring(r, precision)).collect()
}

/// Rounds every ordinate of a typed `GeoJSON` geometry value.
#[must_use]
pub fn round_geometry_value(value: &geojson::Value, precision: i32) -> geojson::Value {
    use geojson::Value as V;

    match value {
        V::Point(p) => V::Point(round_position(p, precision)),
        V::MultiPoint(ps) => V::MultiPoint(round_ring(ps, precision)),
        V::LineString(ls) => V::LineString(round_ring(ls, precision)),
        V::MultiLineString(lss) => V::MultiLineString(round_rings(lss, precision)),
        V::Polygon(rings) => V::Polygon(round_rings(rings, precision)),
        V::MultiPolygon(polys) => V::MultiPolygon(
            polys
                .iter()
                .map(|rings| round_rings(rings, precision))
                .collect(),
        ),
        V::GeometryCollection(geoms) => V::GeometryCollection(
            geoms
                .iter()
                .map(|g| geojson::Geometry::new(round_geometry_value(&g.value, precision)))
                .collect(),
        ),
    }
}
