//! Spreadsheet row import.

use std::collections::BTreeMap;
use std::io::Read;

use serde_json::Value;

use crate::{DocumentStore, Fields, StoreError};

/// One spreadsheet row, keyed by header.
pub type Row = BTreeMap<String, String>;

/// Fields copied from a row into its document.
pub const IMPORT_FIELDS: &[&str] = &[
    "space_id",
    "type",
    "subtype",
    "name",
    "location",
    "url",
    "description",
    "geometry",
    "google_maps_id",
    "closed_for_construction",
];

/// Counts from one [`import_rows`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Documents that did not exist before.
    pub created: usize,
    /// Existing documents merged into.
    pub updated: usize,
    /// Rows without geometry.
    pub skipped: usize,
}

/// Reads every row of a headed CSV document.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] on malformed CSV.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>, StoreError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize::<Row>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn non_empty<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
}

fn generate_id<S>(store: &S, collection: &str, next: &mut usize) -> Result<String, StoreError>
where
    S: DocumentStore + ?Sized,
{
    loop {
        *next += 1;
        let id = format!("auto-{next:06}");
        if store.get(collection, &id)?.is_none() {
            return Ok(id);
        }
    }
}

/// Merge-updates documents from `rows`.
///
/// Each row is keyed by its `id` column; rows without one get a generated
/// key. Only `fields` present in the row are copied. Rows without a
/// `geometry` value are skipped.
///
/// # Errors
///
/// Returns [`StoreError`] on the first failed store operation.
pub fn import_rows<S>(
    store: &mut S,
    collection: &str,
    rows: &[Row],
    fields: &[&str],
) -> Result<ImportReport, StoreError>
where
    S: DocumentStore + ?Sized,
{
    let mut report = ImportReport::default();
    let mut next_generated = 0;

    for (i, row) in rows.iter().enumerate() {
        if non_empty(row, "geometry").is_none() {
            log::debug!("Row {}: no geometry, skipping", i + 2);
            report.skipped += 1;
            continue;
        }

        let id = match non_empty(row, "id") {
            Some(id) => id.to_string(),
            None => generate_id(store, collection, &mut next_generated)?,
        };

        let update: Fields = fields
            .iter()
            .filter_map(|field| {
                row.get(*field)
                    .map(|value| ((*field).to_string(), Value::String(value.clone())))
            })
            .collect();

        if store.get(collection, &id)?.is_some() {
            report.updated += 1;
        } else {
            report.created += 1;
        }

        store.set(collection, &id, update, true)?;
        log::debug!("Document {id} updated");
    }

    log::info!(
        "Imported into {collection}: {} created, {} updated, {} skipped",
        report.created,
        report.updated,
        report.skipped
    );

    Ok(report)
}
