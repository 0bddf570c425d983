//! Store commands: identifier review and correction, import, export.

use std::fs::File;
use std::path::Path;

use public_space_export::export_collection;
use public_space_slug::{find_collisions, review_slugs, slugify};
use public_space_store::{
    DocumentStore as _, Filter, IMPORT_FIELDS, JsonFileStore, apply_slug_correction, import_rows,
    read_rows,
};

use crate::config::Config;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn open_store(config: &Config) -> CliResult<JsonFileStore> {
    log::debug!("Opening store {}", config.store_path.display());
    Ok(JsonFileStore::open(&config.store_path)?)
}

pub fn check_slugs(config: &Config) -> CliResult<()> {
    let store = open_store(config)?;
    let documents = store.query(&config.collection, &Filter::All)?;

    let entries: Vec<(&str, &str)> = documents
        .iter()
        .map(|doc| (doc.id.as_str(), doc.str_field("space_id").unwrap_or_default()))
        .collect();

    let issues = review_slugs(entries.iter().copied());
    for issue in &issues {
        println!(
            "Invalid slug {:?} (doc: {}), suggested {:?}",
            issue.current, issue.document_id, issue.suggested
        );
    }

    let collisions = find_collisions(entries.iter().copied());
    for collision in &collisions {
        println!(
            "Duplicate space_id {:?} in docs: {}",
            collision.space_id,
            collision.document_ids.join(", ")
        );
    }

    log::info!(
        "{} documents checked: {} invalid, {} duplicated",
        documents.len(),
        issues.len(),
        collisions.len()
    );
    if !issues.is_empty() {
        log::info!("Apply a correction with `fix-slug <document-id> [slug]`");
    }

    Ok(())
}

pub fn fix_slug(config: &Config, document_id: &str, slug: Option<&str>) -> CliResult<()> {
    let mut store = open_store(config)?;

    let slug = match slug {
        Some(slug) => slug.to_string(),
        None => {
            let doc = store
                .get(&config.collection, document_id)?
                .ok_or_else(|| format!("Unknown document: {document_id}"))?;
            let suggested = slugify(doc.str_field("space_id").unwrap_or_default());
            if suggested.is_empty() {
                return Err(format!("No slug can be suggested for {document_id}").into());
            }
            suggested
        }
    };

    apply_slug_correction(&mut store, &config.collection, document_id, &slug)?;
    println!("Updated {document_id} to {slug}");

    Ok(())
}

pub fn import(config: &Config, input: &Path, fields: Option<&str>) -> CliResult<()> {
    let fields: Vec<&str> = fields.map_or_else(
        || IMPORT_FIELDS.to_vec(),
        |list| list.split(',').map(str::trim).filter(|f| !f.is_empty()).collect(),
    );

    let rows = read_rows(File::open(input)?)?;
    log::info!("Read {} rows from {}", rows.len(), input.display());

    let mut store = open_store(config)?;
    import_rows(&mut store, &config.collection, &rows, &fields)?;

    Ok(())
}

pub fn export(config: &Config, dir: &Path, basename: &str) -> CliResult<()> {
    let store = open_store(config)?;
    let output = export_collection(&store, &config.collection, dir, basename)?;

    log::info!(
        "Exported {} features to {}, {} and {}",
        output.features,
        output.geojson.display(),
        output.ndjson.display(),
        output.csv.display()
    );

    Ok(())
}
