#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Keyed document store boundary.
//!
//! Spaces are persisted as documents (`id` → field map) grouped into named
//! collections. The pipeline only talks to the [`DocumentStore`] trait;
//! [`MemoryStore`] backs the tests and [`JsonFileStore`] keeps everything
//! in one JSON file on disk.

pub mod file;
pub mod import;
pub mod memory;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use file::JsonFileStore;
pub use import::{IMPORT_FIELDS, ImportReport, import_rows, read_rows};
pub use memory::MemoryStore;

/// Field map of a single document.
pub type Fields = Map<String, Value>;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No document with this id exists in the collection.
    #[error("Document {id} not found in {collection}")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document id.
        id: String,
    },

    /// A proposed identifier is not a strict slug.
    #[error("Invalid slug: {slug:?}")]
    InvalidSlug {
        /// The rejected value.
        slug: String,
    },
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store key, distinct from the space's `space_id` slug.
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// String value of `field`, if present and a string.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Query filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    /// Field equals value.
    Eq(String, Value),
}

impl Filter {
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, value) => fields.get(field) == Some(value),
        }
    }
}

/// Persistent keyed document store.
pub trait DocumentStore {
    /// Fetches one document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Writes a document. With `merge`, `fields` are merged into the
    /// existing document (which is created if absent); otherwise the
    /// document is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn set(
        &mut self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Lists matching documents in id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;
}

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

fn get_in(collections: &Collections, collection: &str, id: &str) -> Option<Document> {
    collections
        .get(collection)
        .and_then(|docs| docs.get(id))
        .map(|fields| Document {
            id: id.to_string(),
            fields: fields.clone(),
        })
}

fn set_in(collections: &mut Collections, collection: &str, id: &str, fields: Fields, merge: bool) {
    let docs = collections.entry(collection.to_string()).or_default();
    if merge {
        if let Some(existing) = docs.get_mut(id) {
            existing.extend(fields);
            return;
        }
    }
    docs.insert(id.to_string(), fields);
}

fn query_in(collections: &Collections, collection: &str, filter: &Filter) -> Vec<Document> {
    collections
        .get(collection)
        .map(|docs| {
            docs.iter()
                .filter(|(_, fields)| filter.matches(fields))
                .map(|(id, fields)| Document {
                    id: id.clone(),
                    fields: fields.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Sets `space_id` on one existing document.
///
/// # Errors
///
/// Returns [`StoreError::InvalidSlug`] if `slug` is not a strict slug and
/// [`StoreError::NotFound`] if the document does not exist.
pub fn apply_slug_correction<S>(
    store: &mut S,
    collection: &str,
    doc_id: &str,
    slug: &str,
) -> Result<(), StoreError>
where
    S: DocumentStore + ?Sized,
{
    if !public_space_slug::is_strict_slug(slug) {
        return Err(StoreError::InvalidSlug {
            slug: slug.to_string(),
        });
    }

    if store.get(collection, doc_id)?.is_none() {
        return Err(StoreError::NotFound {
            collection: collection.to_string(),
            id: doc_id.to_string(),
        });
    }

    let mut fields = Fields::new();
    fields.insert("space_id".to_string(), Value::String(slug.to_string()));
    store.set(collection, doc_id, fields, true)?;

    log::info!("{collection}/{doc_id}: space_id -> {slug}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn merge_keeps_existing_fields() {
        let mut store = MemoryStore::new();
        store
            .set("c", "a", fields(json!({ "name": "A", "type": "park" })), false)
            .unwrap();
        store
            .set("c", "a", fields(json!({ "name": "B" })), true)
            .unwrap();

        let doc = store.get("c", "a").unwrap().unwrap();
        assert_eq!(doc.fields, fields(json!({ "name": "B", "type": "park" })));

        store
            .set("c", "a", fields(json!({ "name": "C" })), false)
            .unwrap();
        let doc = store.get("c", "a").unwrap().unwrap();
        assert_eq!(doc.fields, fields(json!({ "name": "C" })));
    }

    #[test]
    fn query_filters_by_field() {
        let mut store = MemoryStore::new();
        store.set("c", "b", fields(json!({ "type": "pops" })), false).unwrap();
        store.set("c", "a", fields(json!({ "type": "park" })), false).unwrap();
        store.set("c", "c", fields(json!({ "type": "park" })), false).unwrap();

        let parks = store
            .query("c", &Filter::Eq("type".to_string(), json!("park")))
            .unwrap();
        let ids: Vec<_> = parks.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);

        assert_eq!(store.query("c", &Filter::All).unwrap().len(), 3);
        assert!(store.query("missing", &Filter::All).unwrap().is_empty());
    }

    #[test]
    fn slug_correction_updates_only_space_id() {
        let mut store = MemoryStore::new();
        store
            .set("c", "doc1", fields(json!({ "space_id": "Bad Slug", "name": "X" })), false)
            .unwrap();

        apply_slug_correction(&mut store, "c", "doc1", "bad-slug").unwrap();

        let doc = store.get("c", "doc1").unwrap().unwrap();
        assert_eq!(doc.str_field("space_id"), Some("bad-slug"));
        assert_eq!(doc.str_field("name"), Some("X"));
    }

    #[test]
    fn slug_correction_rejects_bad_input() {
        let mut store = MemoryStore::new();
        store.set("c", "doc1", Fields::new(), false).unwrap();

        assert!(matches!(
            apply_slug_correction(&mut store, "c", "doc1", "not--strict"),
            Err(StoreError::InvalidSlug { .. })
        ));
        assert!(matches!(
            apply_slug_correction(&mut store, "c", "nope", "fine"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
