#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-format export of stored public spaces.
//!
//! A collection is read from the [`DocumentStore`] once, prepared once
//! ([`prepare_records`]) and then written as `GeoJSON`, NDJSON and CSV.

pub mod prepare;
pub mod writers;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use public_space_store::{DocumentStore, Filter, StoreError};

pub use prepare::{ExportRecord, prepare_records};
pub use writers::{write_csv, write_geojson, write_ndjson};

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading the collection failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Files written by one [`export_collection`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub geojson: PathBuf,
    pub ndjson: PathBuf,
    pub csv: PathBuf,
    pub features: usize,
}

/// Exports every document of `collection` to
/// `<dir>/<basename>.{geojson,ndjson,csv}`, replacing existing files.
///
/// # Errors
///
/// Returns [`ExportError`] if the store query or any write fails.
pub fn export_collection<S>(
    store: &S,
    collection: &str,
    dir: &Path,
    basename: &str,
) -> Result<ExportOutput, ExportError>
where
    S: DocumentStore + ?Sized,
{
    let documents = store.query(collection, &Filter::All)?;
    log::info!("Read {} documents from {collection}", documents.len());

    let records = prepare_records(&documents);

    std::fs::create_dir_all(dir)?;
    let output = ExportOutput {
        geojson: dir.join(format!("{basename}.geojson")),
        ndjson: dir.join(format!("{basename}.ndjson")),
        csv: dir.join(format!("{basename}.csv")),
        features: records.len(),
    };

    write_geojson(&records, BufWriter::new(File::create(&output.geojson)?))?;
    log::info!("GeoJSON exported to {}", output.geojson.display());

    write_ndjson(&records, BufWriter::new(File::create(&output.ndjson)?))?;
    log::info!("NDJSON exported to {}", output.ndjson.display());

    write_csv(&records, BufWriter::new(File::create(&output.csv)?))?;
    log::info!("CSV exported to {}", output.csv.display());

    Ok(output)
}
