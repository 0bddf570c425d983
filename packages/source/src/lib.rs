#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! NYC open-data sources and their normalization into canonical spaces.
//!
//! Each upstream dataset is described by a TOML file baked in at compile
//! time ([`registry`]). Datasets are downloaded ([`fetch`]), polygon
//! footprints are collapsed to centroids ([`centroids`]), and every
//! feature is mapped onto the canonical schema by a per-type extractor
//! ([`extract`], [`normalize`]). [`combine`] streams all of them into one
//! line-delimited file.

pub mod centroids;
pub mod combine;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod registry;
pub mod source_def;

pub use normalize::{NormalizeError, normalize_feature};
pub use source_def::SourceDefinition;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document was valid JSON but not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing combined output failed.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] public_space_pipeline::PipelineError),

    /// A fetch batch did not finish in time.
    #[error("Timed out after {seconds}s waiting for downloads")]
    Timeout {
        /// Configured limit.
        seconds: u64,
    },

    /// A fetch reported success but left no downloaded file behind.
    #[error("Download for {id} is missing")]
    MissingDownload {
        /// Source id.
        id: String,
    },

    /// Data normalization error.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of what went wrong.
        message: String,
    },
}
