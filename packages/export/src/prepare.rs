//! Record preparation shared by every writer.

use geojson::{Feature, Geometry};
use public_space_geometry::{COORDINATE_PRECISION, round_geometry_value};
use public_space_store::Document;
use serde_json::{Map, Value};

/// Properties stored as nested objects that are flattened to JSON strings.
pub const NESTED_FIELDS: &[&str] = &["details", "amenities", "equipment"];

/// A stored document ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub document_id: String,
    /// Geometry with ordinates already rounded.
    pub geometry: Geometry,
    /// Every stored field except `geometry`, plus `document_id`.
    pub properties: Map<String, Value>,
}

impl ExportRecord {
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

fn parse_geometry(value: &Value) -> Option<Geometry> {
    match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

fn flatten_nested(key: &str, value: Value) -> Value {
    let is_nested = NESTED_FIELDS.contains(&key) && (value.is_object() || value.is_array());
    if is_nested {
        Value::String(value.to_string())
    } else {
        value
    }
}

/// Turns stored documents into export records.
///
/// Archived documents are dropped. Documents whose `geometry` is missing
/// or not valid `GeoJSON` are skipped with a warning.
#[must_use]
pub fn prepare_records(documents: &[Document]) -> Vec<ExportRecord> {
    let mut records = Vec::with_capacity(documents.len());

    for doc in documents {
        if doc.fields.get("archived") == Some(&Value::Bool(true)) {
            log::debug!("Skipping archived document {}", doc.id);
            continue;
        }

        let Some(geometry) = doc.fields.get("geometry").and_then(parse_geometry) else {
            log::warn!("Invalid geometry format in document {}", doc.id);
            continue;
        };

        let mut properties: Map<String, Value> = doc
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "geometry")
            .map(|(key, value)| (key.clone(), flatten_nested(key, value.clone())))
            .collect();
        properties.insert("document_id".to_string(), Value::String(doc.id.clone()));

        records.push(ExportRecord {
            document_id: doc.id.clone(),
            geometry: Geometry::new(round_geometry_value(&geometry.value, COORDINATE_PRECISION)),
            properties,
        });
    }

    log::info!(
        "Prepared {} of {} documents for export",
        records.len(),
        documents.len()
    );

    records
}
