//! Reduction of footprint datasets to centroid points.

use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry};

use crate::SourceError;

/// Outcome of [`reduce_to_centroids`].
#[derive(Debug)]
pub struct CentroidReduction {
    /// Features whose geometry is now a centroid point.
    pub collection: FeatureCollection,
    /// Features dropped because their geometry was missing or empty.
    pub dropped: usize,
}

fn centroid_of(feature: &Feature) -> Option<Geometry> {
    let geometry: geo::Geometry<f64> = feature.geometry.clone()?.try_into().ok()?;
    let point = public_space_geometry::centroid(&geometry)?;
    Some(Geometry::new(geojson::Value::Point(vec![point.x(), point.y()])))
}

/// Replaces every feature's geometry with its centroid.
///
/// Properties are preserved and feature order is unchanged.
#[must_use]
pub fn reduce_to_centroids(collection: FeatureCollection) -> CentroidReduction {
    let total = collection.features.len();
    let mut features = Vec::with_capacity(total);

    for (i, mut feature) in collection.features.into_iter().enumerate() {
        match centroid_of(&feature) {
            Some(point) => {
                feature.geometry = Some(point);
                features.push(feature);
            }
            None => log::debug!("Dropping feature {i}: no usable geometry"),
        }
    }

    let dropped = total - features.len();

    CentroidReduction {
        collection: FeatureCollection {
            bbox: None,
            features,
            foreign_members: collection.foreign_members,
        },
        dropped,
    }
}

/// Reads a `FeatureCollection` from `input`, reduces it to centroids and
/// writes the result to `output`.
///
/// Returns the number of features written.
///
/// # Errors
///
/// Returns [`SourceError`] if either file cannot be accessed or `input` is
/// not a `FeatureCollection`.
pub fn reduce_file(input: &Path, output: &Path) -> Result<usize, SourceError> {
    let text = std::fs::read_to_string(input)?;
    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(SourceError::Normalization {
            message: format!("{} is not a FeatureCollection", input.display()),
        });
    };

    let reduction = reduce_to_centroids(collection);
    if reduction.dropped > 0 {
        log::warn!(
            "{}: dropped {} features without geometry",
            input.display(),
            reduction.dropped
        );
    }

    let mut writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer(&mut writer, &reduction.collection)?;
    writer.flush()?;

    let written = reduction.collection.features.len();
    log::info!("Wrote {written} centroids to {}", output.display());

    Ok(written)
}
