//! Source registry: dataset definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/sources/` is baked into the binary
//! at compile time via [`include_str!`]. The order below is the order
//! datasets are combined in.

use crate::source_def::{SourceDefinition, parse_source_toml};

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[
    (
        "parks-properties",
        include_str!("../sources/parks-properties.toml"),
    ),
    (
        "pedestrian-plazas",
        include_str!("../sources/pedestrian-plazas.toml"),
    ),
    ("pops", include_str!("../sources/pops.toml")),
    (
        "waterfront-public-access-areas",
        include_str!("../sources/waterfront-public-access-areas.toml"),
    ),
    (
        "schoolyards-to-playgrounds",
        include_str!("../sources/schoolyards-to-playgrounds.toml"),
    ),
];

#[cfg(test)]
const EXPECTED_SOURCE_COUNT: usize = 5;

/// Returns all configured source definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this is caught by the tests below).
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the sources selected by a comma-separated id filter.
///
/// With no filter every source is returned. Unknown ids are ignored; a
/// filter matching nothing logs the available ids.
#[must_use]
pub fn enabled_sources(filter: Option<&str>) -> Vec<SourceDefinition> {
    let all = all_sources();

    let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return all;
    };

    let ids: Vec<&str> = filter.split(',').map(str::trim).collect();
    let available: Vec<String> = all.iter().map(|s| s.id.clone()).collect();

    let filtered: Vec<SourceDefinition> =
        all.into_iter().filter(|s| ids.contains(&s.id())).collect();

    if filtered.is_empty() {
        log::warn!(
            "No matching sources found for filter {ids:?}. Available: {}",
            available.join(", ")
        );
    }

    filtered
}

#[cfg(test)]
mod tests {
    use public_space_models::SpaceType;

    use super::*;

    #[test]
    fn loads_all_sources() {
        assert_eq!(all_sources().len(), EXPECTED_SOURCE_COUNT);
    }

    #[test]
    fn source_ids_are_unique() {
        let sources = all_sources();
        let mut ids: Vec<&str> = sources.iter().map(SourceDefinition::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_SOURCE_COUNT);
    }

    #[test]
    fn all_sources_have_required_fields() {
        for (source, (file_stem, _)) in all_sources().iter().zip(SOURCE_TOMLS) {
            assert_eq!(source.id, *file_stem, "id must match file name");
            assert!(!source.name.is_empty(), "{}: name is empty", source.id);
            assert!(
                source.url.starts_with("https://"),
                "{}: url must be https",
                source.id
            );
        }
    }

    #[test]
    fn footprint_datasets_need_centroids() {
        let needs: Vec<(String, SpaceType)> = all_sources()
            .into_iter()
            .filter(|s| s.centroids)
            .map(|s| (s.id, s.space_type))
            .collect();

        assert_eq!(
            needs,
            vec![
                ("parks-properties".to_string(), SpaceType::Park),
                ("pedestrian-plazas".to_string(), SpaceType::Plaza),
                ("schoolyards-to-playgrounds".to_string(), SpaceType::Stp),
            ]
        );
    }

    #[test]
    fn filters_by_id() {
        let picked = enabled_sources(Some("pops, schoolyards-to-playgrounds,nope"));
        let ids: Vec<&str> = picked.iter().map(SourceDefinition::id).collect();
        assert_eq!(ids, vec!["pops", "schoolyards-to-playgrounds"]);

        assert_eq!(enabled_sources(None).len(), EXPECTED_SOURCE_COUNT);
        assert!(enabled_sources(Some("nope")).is_empty());
    }
}
