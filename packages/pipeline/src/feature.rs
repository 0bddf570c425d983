//! Conversion between [`CanonicalSpace`] and `GeoJSON` features.

use geojson::{Feature, Geometry, JsonObject};
use public_space_models::CanonicalSpace;
use serde_json::Value;

/// Reasons a single feature cannot become a [`CanonicalSpace`].
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The feature has no geometry at all.
    #[error("feature has no geometry")]
    MissingGeometry,

    /// The geometry is not a `Point`.
    #[error("expected Point geometry, found {found}")]
    GeometryType {
        /// The geometry type that was found.
        found: &'static str,
    },

    /// The properties do not describe a valid space.
    #[error("invalid record: {message}")]
    Validation {
        /// What was wrong.
        message: String,
    },
}

impl RecordError {
    /// Whether this rejection is about the geometry rather than properties.
    #[must_use]
    pub const fn is_geometry(&self) -> bool {
        matches!(self, Self::MissingGeometry | Self::GeometryType { .. })
    }
}

/// `GeoJSON` type name of a geometry value.
#[must_use]
pub const fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Extracts `(longitude, latitude)` from a `Point` geometry.
///
/// # Errors
///
/// Returns [`RecordError::GeometryType`] for any other geometry and
/// [`RecordError::Validation`] if the point has fewer than two ordinates.
pub fn point_coordinates(geometry: &Geometry) -> Result<(f64, f64), RecordError> {
    let geojson::Value::Point(position) = &geometry.value else {
        return Err(RecordError::GeometryType {
            found: geometry_kind(&geometry.value),
        });
    };

    match position.as_slice() {
        [lon, lat, ..] => Ok((*lon, *lat)),
        _ => Err(RecordError::Validation {
            message: format!("point has {} ordinates, expected 2", position.len()),
        }),
    }
}

/// Converts a canonical `GeoJSON` feature into a [`CanonicalSpace`].
///
/// Properties other than the canonical ones land in
/// [`CanonicalSpace::extra`] in their original order.
///
/// # Errors
///
/// Returns [`RecordError`] when the geometry is missing or not a point, or
/// when the properties lack a valid `type`.
pub fn feature_to_space(feature: &Feature) -> Result<CanonicalSpace, RecordError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(RecordError::MissingGeometry)?;
    let (longitude, latitude) = point_coordinates(geometry)?;

    let properties = feature.properties.clone().unwrap_or_default();
    let mut space: CanonicalSpace =
        serde_json::from_value(Value::Object(properties)).map_err(|e| RecordError::Validation {
            message: e.to_string(),
        })?;

    space.longitude = longitude;
    space.latitude = latitude;

    Ok(space)
}

/// Converts a [`CanonicalSpace`] into a `GeoJSON` point feature.
///
/// Coordinates are written as stored; sinks apply rounding.
#[must_use]
pub fn space_to_feature(space: &CanonicalSpace) -> Feature {
    let properties = match serde_json::to_value(space) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    };

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            space.longitude,
            space.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use public_space_models::SpaceType;
    use serde_json::json;

    use super::*;

    fn feature(value: Value) -> Feature {
        serde_json::from_value::<Feature>(value).unwrap()
    }

    #[test]
    fn converts_point_feature() {
        let space = feature_to_space(&feature(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [-73.98, 40.75] },
            "properties": {
                "type": "pops",
                "name": "Sony Plaza",
                "location": null,
                "url": "https://apops.mas.org/pops/m040001",
                "hours": "24/7"
            }
        })))
        .unwrap();

        assert_eq!(space.space_type, SpaceType::Pops);
        assert_eq!(space.name.as_deref(), Some("Sony Plaza"));
        assert!(space.location.is_none());
        assert!((space.longitude + 73.98).abs() < f64::EPSILON);
        assert_eq!(space.extra.get("hours"), Some(&json!("24/7")));
    }

    #[test]
    fn rejects_polygon_geometry() {
        let err = feature_to_space(&feature(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            },
            "properties": { "type": "park" }
        })))
        .unwrap_err();

        assert!(matches!(err, RecordError::GeometryType { found: "Polygon" }));
        assert!(err.is_geometry());
    }

    #[test]
    fn rejects_missing_geometry_and_bad_type() {
        let missing = feature_to_space(&feature(json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "type": "park" }
        })))
        .unwrap_err();
        assert!(matches!(missing, RecordError::MissingGeometry));

        let bad_type = feature_to_space(&feature(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
            "properties": { "type": "garden" }
        })))
        .unwrap_err();
        assert!(matches!(bad_type, RecordError::Validation { .. }));
        assert!(!bad_type.is_geometry());
    }

    #[test]
    fn space_to_feature_keeps_extras() {
        let mut space = CanonicalSpace::new(SpaceType::Wpaa, -74.01, 40.70);
        space.space_id = Some("wpaa-battery".to_string());
        space.extra.insert("subtype".to_string(), json!("esplanade"));

        let feature = space_to_feature(&space);
        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["type"], json!("wpaa"));
        assert_eq!(props["space_id"], json!("wpaa-battery"));
        assert_eq!(props["subtype"], json!("esplanade"));

        let back = feature_to_space(&feature).unwrap();
        assert_eq!(back, space);
    }
}
