//! Output writers.
//!
//! All three writers consume the same prepared records, so feature counts
//! and rounded coordinates agree across formats.

use std::io::Write;

use geojson::FeatureCollection;
use public_space_geometry::{COORDINATE_PRECISION, centroid, round_geometry_value};
use serde_json::{Map, Value};

use crate::ExportError;
use crate::prepare::ExportRecord;

/// Writes one `FeatureCollection`, features in record order.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the write fails.
pub fn write_geojson<W: Write>(records: &[ExportRecord], mut writer: W) -> Result<(), ExportError> {
    let collection = FeatureCollection {
        bbox: None,
        features: records.iter().map(ExportRecord::to_feature).collect(),
        foreign_members: None,
    };

    serde_json::to_writer(&mut writer, &collection)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// Writes one feature per line.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the write fails.
pub fn write_ndjson<W: Write>(records: &[ExportRecord], mut writer: W) -> Result<(), ExportError> {
    for record in records {
        serde_json::to_writer(&mut writer, &record.to_feature())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}

/// Representative point of a geometry: the point itself, or the centroid.
fn representative_point(record: &ExportRecord) -> Option<(f64, f64)> {
    if let geojson::Value::Point(p) = &record.geometry.value {
        return Some((*p.first()?, *p.get(1)?));
    }

    let geometry = geo::Geometry::<f64>::try_from(record.geometry.value.clone()).ok()?;
    let point = centroid(&geometry)?;

    match round_geometry_value(
        &geojson::Value::Point(vec![point.x(), point.y()]),
        COORDINATE_PRECISION,
    ) {
        geojson::Value::Point(p) if p.len() == 2 => Some((p[0], p[1])),
        _ => None,
    }
}

fn csv_row(record: &ExportRecord) -> Map<String, Value> {
    let mut row = record.properties.clone();

    if let Some((longitude, latitude)) = representative_point(record) {
        row.insert("longitude".to_string(), Value::from(longitude));
        row.insert("latitude".to_string(), Value::from(latitude));
    } else {
        log::warn!("{}: no representative point for CSV", record.document_id);
    }

    row
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes a flat CSV with every field quoted.
///
/// The header is the union of all row keys in first-seen order, where each
/// row is its properties followed by `longitude` and `latitude`. Missing
/// keys and nulls are written as empty strings.
///
/// # Errors
///
/// Returns [`ExportError`] if the write fails.
pub fn write_csv<W: Write>(records: &[ExportRecord], writer: W) -> Result<(), ExportError> {
    let rows: Vec<_> = records.iter().map(csv_row).collect();

    let mut header: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key);
            }
        }
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(&header)?;
    for row in &rows {
        csv_writer.write_record(header.iter().map(|key| csv_cell(row.get(*key))))?;
    }
    csv_writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use public_space_store::Document;
    use serde_json::json;

    use super::*;
    use crate::prepare::prepare_records;

    fn records() -> Vec<ExportRecord> {
        let docs = [
            json!({
                "name": "A",
                "url": "https://a.example",
                "geometry": "{\"type\":\"Point\",\"coordinates\":[-73.1234567,40.5]}"
            }),
            json!({
                "name": "B \"quoted\"",
                "location": "Broadway",
                "geometry": { "type": "Point", "coordinates": [-73.5, 40.25] }
            }),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, fields)| Document {
            id: format!("doc{i}"),
            fields: fields.as_object().unwrap().clone(),
        })
        .collect::<Vec<_>>();

        prepare_records(&docs)
    }

    #[test]
    fn csv_header_is_union_with_empty_quoted_gaps() {
        let mut out = Vec::new();
        write_csv(&records(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "\"name\",\"url\",\"document_id\",\"longitude\",\"latitude\",\"location\"",
                "\"A\",\"https://a.example\",\"doc0\",\"-73.123457\",\"40.5\",\"\"",
                "\"B \"\"quoted\"\"\",\"\",\"doc1\",\"-73.5\",\"40.25\",\"Broadway\"",
            ]
        );
    }

    #[test]
    fn ndjson_and_geojson_agree() {
        let records = records();

        let mut ndjson = Vec::new();
        write_ndjson(&records, &mut ndjson).unwrap();
        let mut geojson = Vec::new();
        write_geojson(&records, &mut geojson).unwrap();

        let ndjson = String::from_utf8(ndjson).unwrap();
        assert!(ndjson.ends_with("}\n"));
        assert!(!ndjson.ends_with("\n\n"));

        let from_lines: Vec<Value> = ndjson
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap())
            .collect();
        let collection: Value = serde_json::from_slice(&geojson).unwrap();
        let from_collection = collection["features"].as_array().unwrap();

        assert_eq!(from_lines.len(), from_collection.len());
        for (a, b) in from_lines.iter().zip(from_collection) {
            assert_eq!(a["geometry"]["coordinates"], b["geometry"]["coordinates"]);
        }
        assert_eq!(from_lines[0]["geometry"]["coordinates"], json!([-73.123_457, 40.5]));
    }

    #[test]
    fn polygon_rows_use_centroid() {
        let docs = [Document {
            id: "poly".to_string(),
            fields: json!({
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
                }
            })
            .as_object()
            .unwrap()
            .clone(),
        }];

        let mut out = Vec::new();
        write_csv(&prepare_records(&docs), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1), Some("\"poly\",\"1.0\",\"1.0\""));
    }
}
