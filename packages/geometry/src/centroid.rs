//! Centroid reduction of footprint geometries.

use geo::{Centroid as _, Geometry, Point};

/// Returns the geometric centroid of `geometry`.
///
/// Polygons use their area-weighted centroid; multi-polygons weight each
/// member by its area. Points are returned unchanged. Returns `None` for
/// empty geometries.
#[must_use]
pub fn centroid(geometry: &Geometry<f64>) -> Option<Point<f64>> {
    geometry.centroid()
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use super::*;

    #[test]
    fn polygon_centroid_is_its_center() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        let c = centroid(&Geometry::Polygon(square)).unwrap();
        assert!((c.x() - 1.0).abs() < 1e-12);
        assert!((c.y() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn multipolygon_centroid_is_area_weighted() {
        // 1x1 square at the origin and a 3x1 rectangle from x=10..13.
        let small = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        let large = polygon![
            (x: 10.0, y: 0.0),
            (x: 13.0, y: 0.0),
            (x: 13.0, y: 1.0),
            (x: 10.0, y: 1.0),
        ];
        let c = centroid(&Geometry::MultiPolygon(MultiPolygon(vec![small, large]))).unwrap();
        // (0.5 * 1 + 11.5 * 3) / 4
        assert!((c.x() - 8.75).abs() < 1e-9);
        assert!((c.y() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_geometry_has_no_centroid() {
        assert!(centroid(&Geometry::MultiPolygon(MultiPolygon::<f64>(vec![]))).is_none());
    }
}
