//! Nearest-reference enrichment.

use geo::Point;
use geojson::GeoJson;
use public_space_geometry::{GeometryError, great_circle_km, nearest_feature};
use public_space_models::{CanonicalSpace, SpaceType};
use public_space_pipeline::{Stage, StageOutcome};

/// Name used when no reference feature (or no name) is available.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Default property holding a reference feature's name.
pub const DEFAULT_NAME_PROPERTY: &str = "Name";

/// A named point of interest used as a join target.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFeature {
    pub name: Option<String>,
    pub point: Point<f64>,
}

/// Immutable set of reference features, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    features: Vec<ReferenceFeature>,
}

impl ReferenceSet {
    #[must_use]
    pub const fn new(features: Vec<ReferenceFeature>) -> Self {
        Self { features }
    }

    /// Loads reference features from a `FeatureCollection`.
    ///
    /// Non-point geometries are reduced to their centroid. Features
    /// without a usable geometry are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Conversion`] if `geojson` is not a
    /// `FeatureCollection`.
    pub fn load(geojson: &GeoJson, name_property: &str) -> Result<Self, GeometryError> {
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(GeometryError::Conversion {
                message: "reference features must be a FeatureCollection".to_string(),
            });
        };

        let mut features = Vec::with_capacity(collection.features.len());

        for (i, feature) in collection.features.iter().enumerate() {
            let point = feature
                .geometry
                .clone()
                .and_then(|g| geo::Geometry::<f64>::try_from(g).ok())
                .and_then(|g| match g {
                    geo::Geometry::Point(p) => Some(p),
                    other => public_space_geometry::centroid(&other),
                });

            let Some(point) = point else {
                log::warn!("Skipping reference feature {i}: no usable geometry");
                continue;
            };

            let name = feature
                .property(name_property)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            features.push(ReferenceFeature { name, point });
        }

        log::info!("Loaded {} reference features", features.len());

        Ok(Self { features })
    }

    #[must_use]
    pub fn features(&self) -> &[ReferenceFeature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The reference feature closest to `point` by great-circle distance.
    #[must_use]
    pub fn nearest(&self, point: &Point<f64>) -> Option<&ReferenceFeature> {
        nearest_feature(point, &self.features, |f| f.point, great_circle_km)
    }

    /// Name of the nearest feature, or [`UNKNOWN_NAME`].
    #[must_use]
    pub fn nearest_name(&self, point: &Point<f64>) -> &str {
        self.nearest(point)
            .and_then(|f| f.name.as_deref())
            .unwrap_or(UNKNOWN_NAME)
    }
}

/// Renames schoolyards after their nearest school.
///
/// Every record passes through; only `stp` records are changed.
pub struct SchoolyardEnricher {
    schools: ReferenceSet,
}

impl SchoolyardEnricher {
    #[must_use]
    pub const fn new(schools: ReferenceSet) -> Self {
        Self { schools }
    }

    /// Sets `name` and `description` from the nearest school.
    ///
    /// Returns `false` (and leaves the record alone) for anything other
    /// than a schoolyard.
    pub fn enrich(&self, space: &mut CanonicalSpace) -> bool {
        if space.space_type != SpaceType::Stp {
            return false;
        }

        let name = self
            .schools
            .nearest_name(&Point::new(space.longitude, space.latitude))
            .to_string();

        space.description = Some(format!(
            "The schoolyard at {name} which is open to the public after school hours as part \
             of the schoolyards to playgrounds program."
        ));
        space.name = Some(name);

        true
    }
}

impl Stage for SchoolyardEnricher {
    type Output = CanonicalSpace;

    fn process(&mut self, mut space: CanonicalSpace) -> StageOutcome<CanonicalSpace> {
        if self.enrich(&mut space) {
            log::debug!("{}: named {:?}", space.label(), space.name);
        }
        StageOutcome::Emit(space)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schools() -> ReferenceSet {
        let geojson = GeoJson::from_json_value(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-73.95, 40.75] },
                    "properties": { "Name": "P.S. 1" }
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-73.91, 40.70], [-73.89, 40.70], [-73.89, 40.72], [-73.91, 40.72], [-73.91, 40.70]]]
                    },
                    "properties": { "Name": "I.S. 2" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [-74.10, 40.60] },
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": null,
                    "properties": { "Name": "No Geometry" }
                }
            ]
        }))
        .unwrap();

        ReferenceSet::load(&geojson, DEFAULT_NAME_PROPERTY).unwrap()
    }

    #[test]
    fn loads_points_and_centroids() {
        let set = schools();
        assert_eq!(set.len(), 3);
        let centroid = set.features()[1].point;
        assert!((centroid.x() + 73.90).abs() < 1e-9);
        assert!((centroid.y() - 40.71).abs() < 1e-9);
        assert!(set.features()[2].name.is_none());
    }

    #[test]
    fn nearest_name_falls_back_to_unknown() {
        let set = schools();
        assert_eq!(set.nearest_name(&Point::new(-73.901, 40.709)), "I.S. 2");
        assert_eq!(set.nearest_name(&Point::new(-74.11, 40.61)), UNKNOWN_NAME);
        assert_eq!(
            ReferenceSet::default().nearest_name(&Point::new(0.0, 0.0)),
            UNKNOWN_NAME
        );
    }

    #[test]
    fn enriches_only_schoolyards() {
        let enricher = SchoolyardEnricher::new(schools());

        let mut yard = CanonicalSpace::new(SpaceType::Stp, -73.951, 40.751);
        assert!(enricher.enrich(&mut yard));
        assert_eq!(yard.name.as_deref(), Some("P.S. 1"));
        assert_eq!(
            yard.description.as_deref(),
            Some(
                "The schoolyard at P.S. 1 which is open to the public after school hours as \
                 part of the schoolyards to playgrounds program."
            )
        );

        let mut park = CanonicalSpace::new(SpaceType::Park, -73.951, 40.751);
        park.name = Some("Keep Me".to_string());
        assert!(!enricher.enrich(&mut park));
        assert_eq!(park.name.as_deref(), Some("Keep Me"));
    }

    #[test]
    fn empty_reference_set_names_unknown() {
        let mut stage = SchoolyardEnricher::new(ReferenceSet::default());
        let StageOutcome::Emit(yard) =
            stage.process(CanonicalSpace::new(SpaceType::Stp, -73.9, 40.7))
        else {
            panic!("schoolyards always pass through");
        };
        assert_eq!(yard.name.as_deref(), Some(UNKNOWN_NAME));
    }
}
