//! Point-in-polygon tests and borough resolution.
//!
//! Borough polygons are kept in the order they were loaded. Lookups return
//! the first polygon in that order that contains the point, so the
//! R-tree backed [`BoroughIndex`] and the linear [`borough_for_point`]
//! always agree. Boroughs are assumed not to overlap; this is not checked.

use geo::{BoundingRect, Intersects, MultiPolygon, Point};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};

use crate::GeometryError;

/// A named administrative polygon used as a lookup target.
#[derive(Debug, Clone, PartialEq)]
pub struct BoroughPolygon {
    /// Borough name as it appears in the boundary file.
    pub name: String,
    /// Boundary; single polygons are stored as a one-element multi-polygon.
    pub polygon: MultiPolygon<f64>,
}

/// Returns `true` if `point` lies inside `polygon` or on its boundary.
///
/// Holes are respected: a point strictly inside a hole is outside.
#[must_use]
pub fn point_in_polygon(point: &Point<f64>, polygon: &MultiPolygon<f64>) -> bool {
    polygon.intersects(point)
}

/// Returns the name of the first borough whose polygon contains `point`.
#[must_use]
pub fn borough_for_point<'a>(point: &Point<f64>, boroughs: &'a [BoroughPolygon]) -> Option<&'a str> {
    boroughs
        .iter()
        .find(|b| point_in_polygon(point, &b.polygon))
        .map(|b| b.name.as_str())
}

/// Loads borough polygons from a `GeoJSON` `FeatureCollection`.
///
/// The borough name is read from `name_property`. Features without a
/// name, or with a geometry that is not a `Polygon`/`MultiPolygon`, are
/// skipped with a warning.
///
/// # Errors
///
/// Returns [`GeometryError::Conversion`] if the document is not a
/// `FeatureCollection`.
pub fn load_boroughs(
    geojson: &GeoJson,
    name_property: &str,
) -> Result<Vec<BoroughPolygon>, GeometryError> {
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(GeometryError::Conversion {
            message: "borough boundaries must be a FeatureCollection".to_string(),
        });
    };

    let mut boroughs = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.iter().enumerate() {
        let Some(name) = feature
            .property(name_property)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            log::warn!("Skipping boundary feature {i}: no '{name_property}' property");
            continue;
        };

        let Some(polygon) = feature.geometry.clone().and_then(to_multipolygon) else {
            log::warn!("Skipping boundary '{name}': geometry is not a polygon");
            continue;
        };

        boroughs.push(BoroughPolygon {
            name: name.to_string(),
            polygon,
        });
    }

    log::info!("Loaded {} borough polygons", boroughs.len());

    Ok(boroughs)
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Envelope of one borough, pointing back into the ordered borough list.
struct BoroughEntry {
    order: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoroughEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Borough polygons with an R-tree over their bounding boxes.
///
/// Built once per run and only read afterwards.
pub struct BoroughIndex {
    boroughs: Vec<BoroughPolygon>,
    tree: RTree<BoroughEntry>,
}

impl BoroughIndex {
    /// Builds the index, preserving the order of `boroughs` for tie-breaks.
    #[must_use]
    pub fn new(boroughs: Vec<BoroughPolygon>) -> Self {
        let entries = boroughs
            .iter()
            .enumerate()
            .map(|(order, b)| BoroughEntry {
                order,
                envelope: compute_envelope(&b.polygon),
            })
            .collect();

        Self {
            boroughs,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Loads borough polygons from a `GeoJSON` document and indexes them.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the document is not a `FeatureCollection`.
    pub fn from_geojson(geojson: &GeoJson, name_property: &str) -> Result<Self, GeometryError> {
        Ok(Self::new(load_boroughs(geojson, name_property)?))
    }

    /// Looks up the borough containing `point`.
    ///
    /// When several polygons contain the point (shared edges), the one
    /// loaded first wins, matching [`borough_for_point`].
    #[must_use]
    pub fn lookup(&self, point: &Point<f64>) -> Option<&str> {
        let query_env = AABB::from_point([point.x(), point.y()]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| point_in_polygon(point, &self.boroughs[entry.order].polygon))
            .map(|entry| entry.order)
            .min()
            .map(|order| self.boroughs[order].name.as_str())
    }

    /// The indexed boroughs, in load order.
    #[must_use]
    pub fn boroughs(&self) -> &[BoroughPolygon] {
        &self.boroughs
    }

    /// Number of indexed boroughs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boroughs.len()
    }

    /// Whether the index holds no boroughs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boroughs.is_empty()
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
