//! Raw feature to canonical stub.

use geojson::Feature;
use public_space_models::{CanonicalSpace, SpaceType};
use public_space_pipeline::feature::geometry_kind;

use crate::extract::extractor;

/// Why a raw feature could not be normalized.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The feature has no geometry.
    #[error("feature has no geometry")]
    MissingGeometry,

    /// The geometry is not a point (footprints must be reduced first).
    #[error("expected Point geometry, found {found}")]
    GeometryType {
        /// The geometry type that was found.
        found: &'static str,
    },
}

/// Maps a raw feature from a dataset of `space_type` onto the canonical
/// schema.
///
/// The point is carried over untouched; `name`, `location` and `url` come
/// from the dataset's extractor. `space_id` and `description` are left
/// unset.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the geometry is missing or not a point.
pub fn normalize_feature(
    space_type: SpaceType,
    feature: &Feature,
) -> Result<CanonicalSpace, NormalizeError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(NormalizeError::MissingGeometry)?;

    let geojson::Value::Point(position) = &geometry.value else {
        return Err(NormalizeError::GeometryType {
            found: geometry_kind(&geometry.value),
        });
    };
    let [longitude, latitude, ..] = position.as_slice() else {
        return Err(NormalizeError::MissingGeometry);
    };

    let empty = serde_json::Map::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);
    let extract = extractor(space_type);

    let mut space = CanonicalSpace::new(space_type, *longitude, *latitude);
    space.name = (extract.name)(props);
    space.location = (extract.location)(props);
    space.url = (extract.url)(props);

    Ok(space)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn feature(value: serde_json::Value) -> Feature {
        serde_json::from_value::<Feature>(value).unwrap()
    }

    #[test]
    fn normalizes_point_feature() {
        let space = normalize_feature(
            SpaceType::Wpaa,
            &feature(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-73.958_123, 40.742_456] },
                "properties": { "WPAA_Name": "Gantry Plaza", "WPAA_ID": 7, "Borough": "Q" }
            })),
        )
        .unwrap();

        assert_eq!(space.space_type, SpaceType::Wpaa);
        assert_eq!(space.name.as_deref(), Some("Gantry Plaza"));
        assert!(space.location.is_none());
        assert!((space.longitude + 73.958_123).abs() < f64::EPSILON);
        assert!((space.latitude - 40.742_456).abs() < f64::EPSILON);
        assert!(space.extra.is_empty());
        assert!(space.space_id.is_none());
    }

    #[test]
    fn rejects_polygons_and_missing_geometry() {
        let polygon = feature(json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]
            },
            "properties": {}
        }));
        assert!(matches!(
            normalize_feature(SpaceType::Park, &polygon),
            Err(NormalizeError::GeometryType {
                found: "MultiPolygon"
            })
        ));

        let missing = feature(json!({ "type": "Feature", "geometry": null, "properties": null }));
        assert!(matches!(
            normalize_feature(SpaceType::Park, &missing),
            Err(NormalizeError::MissingGeometry)
        ));
    }
}
