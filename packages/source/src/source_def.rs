//! Config-driven dataset definition.

use std::path::{Path, PathBuf};

use public_space_models::SpaceType;
use serde::Deserialize;

/// One upstream open-data dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier, also the local file stem (e.g. `"pops"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Canonical type assigned to every feature of this dataset.
    pub space_type: SpaceType,
    /// Download URL returning a `GeoJSON` `FeatureCollection`.
    pub url: String,
    /// Whether features are footprints that must be reduced to centroids
    /// before normalization.
    #[serde(default)]
    pub centroids: bool,
}

impl SourceDefinition {
    /// Returns the unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the raw download is stored.
    #[must_use]
    pub fn raw_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.geojson", self.id))
    }

    /// Where the centroid-reduced copy is stored.
    #[must_use]
    pub fn centroid_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}-centroids.geojson", self.id))
    }

    /// The file normalization reads from: the centroid copy for footprint
    /// datasets, the raw download otherwise.
    #[must_use]
    pub fn input_path(&self, dir: &Path) -> PathBuf {
        if self.centroids {
            self.centroid_path(dir)
        } else {
            self.raw_path(dir)
        }
    }
}

/// Parses a source definition from TOML text.
///
/// # Errors
///
/// Returns an error message if the TOML is malformed or fields are missing.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}
