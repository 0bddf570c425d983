//! Combining every dataset into one canonical line-delimited stream.

use std::path::Path;
use std::sync::Arc;

use geojson::GeoJson;
use public_space_models::CanonicalSpace;
use public_space_pipeline::progress::ProgressCallback;
use public_space_pipeline::{RunSummary, SinkSet};

use crate::SourceError;
use crate::normalize::normalize_feature;
use crate::source_def::SourceDefinition;

/// Normalizes one dataset's `FeatureCollection`, writing canonical stubs
/// to `sinks`.
fn combine_one(
    dir: &Path,
    source: &SourceDefinition,
    sinks: &mut SinkSet<'_, CanonicalSpace>,
) -> Result<RunSummary, SourceError> {
    let path = source.input_path(dir);
    let text = std::fs::read_to_string(&path)?;

    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(SourceError::Normalization {
            message: format!("{} is not a FeatureCollection", path.display()),
        });
    };

    let mut summary = RunSummary::new();

    for (i, feature) in collection.features.iter().enumerate() {
        summary.features_seen += 1;

        match normalize_feature(source.space_type, feature) {
            Ok(space) => {
                sinks.write(&space);
                summary.emitted += 1;
            }
            Err(e) => {
                log::warn!("[{}] feature {i}: {e}", source.id);
                summary.geometry_rejections += 1;
            }
        }
    }

    summary.log(&source.id);

    Ok(summary)
}

/// Normalizes every source in `sources`, in order, into `sinks`.
///
/// Footprint datasets are read from their centroid copies, so
/// [`reduce_file`](crate::centroids::reduce_file) must have run first.
/// Features that are not points are counted and skipped.
///
/// # Errors
///
/// Returns [`SourceError`] if a dataset file is missing or unreadable, or
/// if a sink fails.
pub fn combine_sources(
    dir: &Path,
    sources: &[SourceDefinition],
    sinks: SinkSet<'_, CanonicalSpace>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, SourceError> {
    let mut sinks = sinks;
    let mut total = RunSummary::new();

    progress.set_total(sources.len() as u64);

    for source in sources {
        progress.set_message(format!("Combining {}", source.name));
        total.merge(combine_one(dir, source, &mut sinks)?);
        progress.inc(1);
    }

    sinks.finish()?;
    progress.finish(format!("Combined {} spaces", total.emitted));

    Ok(total)
}

#[cfg(test)]
mod tests {
    use public_space_models::SpaceType;
    use public_space_pipeline::progress::null_progress;
    use public_space_pipeline::{FeatureEvent, FeatureLines, NdjsonSink, feature_to_space};

    use super::*;
    use crate::source_def::parse_source_toml;

    fn source(id: &str, space_type: &str, centroids: bool) -> SourceDefinition {
        parse_source_toml(&format!(
            "id = \"{id}\"\nname = \"{id}\"\nspace_type = \"{space_type}\"\n\
             url = \"https://example.invalid\"\ncentroids = {centroids}\n"
        ))
        .unwrap()
    }

    #[test]
    fn combines_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("plazas-centroids.geojson"),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[-73.88,40.75]},
                 "properties":{"plazaname":"Diversity Plaza","onstreet":"37 Rd","fromstreet":"73 St","tostreet":"74 St"}}
            ]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("pops.geojson"),
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[-73.97,40.76]},
                 "properties":{"bldg_name":"Sony Building","popsnumber":"M040001"}},
                {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},
                 "properties":{"bldg_name":"Footprint"}}
            ]}"#,
        )
        .unwrap();

        let sources = [source("plazas", "plaza", true), source("pops", "pops", false)];
        let mut out = NdjsonSink::new(Vec::new());
        let sinks = SinkSet::new().with("ndjson", &mut out);

        let summary = combine_sources(dir.path(), &sources, sinks, &null_progress()).unwrap();
        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.geometry_rejections, 1);

        let written = out.into_inner();
        let spaces: Vec<CanonicalSpace> = FeatureLines::new(written.as_slice())
            .map(|e| match e.unwrap() {
                FeatureEvent::Feature { feature, .. } => feature_to_space(&feature).unwrap(),
                FeatureEvent::Malformed { message, .. } => panic!("{message}"),
            })
            .collect();

        assert_eq!(spaces[0].space_type, SpaceType::Plaza);
        assert_eq!(
            spaces[0].location.as_deref(),
            Some("37 Rd between 73 St & 74 St")
        );
        assert_eq!(spaces[1].space_type, SpaceType::Pops);
        assert_eq!(
            spaces[1].url.as_deref(),
            Some("https://apops.mas.org/pops/M040001")
        );
    }

    #[test]
    fn missing_dataset_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let sources = [source("absent", "park", false)];
        let result = combine_sources(dir.path(), &sources, SinkSet::new(), &null_progress());
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
