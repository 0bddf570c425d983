#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Streaming record pipeline over line-delimited `GeoJSON`.
//!
//! A run reads features one line at a time ([`reader::FeatureLines`]),
//! converts each to a [`CanonicalSpace`](public_space_models::CanonicalSpace),
//! hands it to a [`stage::Stage`] and fans the stage output out to a
//! [`sink::SinkSet`]. One record is fully processed before the next is
//! read. Counters accumulate in an explicit [`summary::RunSummary`].
//!
//! Bad input never aborts a run: malformed lines, unsupported geometries
//! and validation failures are counted and logged. Only reader I/O errors
//! and sink failures surface as [`PipelineError`].

pub mod describe;
pub mod feature;
pub mod progress;
pub mod reader;
pub mod sheet;
pub mod sink;
pub mod stage;
pub mod summary;
pub mod validate;

pub use describe::{
    CommandOracle, DescribeStage, DescriptionChange, DescriptionOracle, OracleError,
    interpret_response,
};
pub use feature::{RecordError, feature_to_space, space_to_feature};
pub use reader::{FeatureEvent, FeatureLines};
pub use sheet::{AssignIdsStage, SheetRecord, validate_sheet};
pub use sink::{CountSink, CsvSink, NdjsonSink, RecordSink, SinkSet};
pub use stage::{PassThrough, Stage, StageOutcome, run_stage};
pub use summary::RunSummary;
pub use validate::{ValidateStage, ValidationError, validate};

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV input could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A sink failed; the remaining sinks were flushed and closed.
    #[error("Sink '{name}' failed: {source}")]
    Sink {
        /// Name the sink was registered under.
        name: String,
        /// Underlying failure.
        #[source]
        source: SinkError,
    },
}

/// Errors raised by an individual [`RecordSink`].
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing to the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The sink was already closed after an earlier failure.
    #[error("sink is closed")]
    Closed,
}
