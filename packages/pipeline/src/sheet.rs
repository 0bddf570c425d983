//! Spreadsheet interchange.
//!
//! Rows have the columns `space_id,type,name,location,url,description,geometry`
//! where `geometry` holds a `GeoJSON` geometry as text. [`AssignIdsStage`]
//! produces such rows from canonical features; [`validate_sheet`] checks
//! hand-edited rows and writes the valid ones back as canonical features.
//! Extra columns are ignored.

use std::io::Read;
use std::str::FromStr as _;
use std::sync::Arc;

use public_space_geometry::COORDINATE_PRECISION;
use public_space_geometry::precision::round_ordinate;
use public_space_models::{CanonicalSpace, SpaceType};
use public_space_slug::{SlugAllocator, is_strict_slug, suggest_space_id};
use serde::{Deserialize, Serialize};

use crate::PipelineError;
use crate::progress::ProgressCallback;
use crate::sink::SinkSet;
use crate::stage::{Stage, StageOutcome};
use crate::summary::RunSummary;
use crate::validate::{ValidateStage, ValidationError};

#[derive(Debug, Deserialize)]
struct SheetRow {
    space_id: Option<String>,
    #[serde(rename = "type")]
    space_type: Option<String>,
    name: Option<String>,
    location: Option<String>,
    url: Option<String>,
    description: Option<String>,
    geometry: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_point(text: &str, space_id: &str) -> Result<(f64, f64), ValidationError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| ValidationError::InvalidGeometry)?;
    let geometry: geojson::Geometry =
        serde_json::from_value(value).map_err(|_| ValidationError::InvalidGeometry)?;

    match &geometry.value {
        geojson::Value::Point(position) => match position.as_slice() {
            [lon, lat] if lon.is_finite() && lat.is_finite() => Ok((*lon, *lat)),
            _ => Err(ValidationError::InvalidPoint(space_id.to_string())),
        },
        _ => Err(ValidationError::InvalidPoint(space_id.to_string())),
    }
}

/// Checks one row, returning the space or every failing check.
fn check_row(row: SheetRow) -> Result<CanonicalSpace, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let space_id = row.space_id.unwrap_or_default();
    if !is_strict_slug(&space_id) {
        errors.push(ValidationError::InvalidSpaceId(space_id.clone()));
    }

    let type_text = row.space_type.unwrap_or_default();
    let space_type = SpaceType::from_str(type_text.trim()).ok();
    if space_type.is_none() {
        errors.push(ValidationError::InvalidType(type_text));
    }

    let name = non_blank(row.name);
    if name.is_none() {
        errors.push(ValidationError::EmptyName);
    }
    let description = non_blank(row.description);
    if description.is_none() {
        errors.push(ValidationError::EmptyDescription);
    }

    let point = match row.geometry.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => parse_point(text, &space_id),
        _ => Err(ValidationError::InvalidGeometry),
    };
    let point = point.map_err(|e| errors.push(e)).ok();

    match (space_type, point) {
        (Some(space_type), Some((lon, lat))) if errors.is_empty() => {
            let mut space = CanonicalSpace::new(space_type, lon, lat);
            space.space_id = Some(space_id);
            space.name = name;
            space.location = non_blank(row.location);
            space.url = non_blank(row.url);
            space.description = description;
            Ok(space)
        }
        _ => Err(errors),
    }
}

/// Validates every row of a spreadsheet export.
///
/// Row numbers in the summary count the header as row 1, matching what a
/// spreadsheet shows. Duplicate `space_id`s are reported on their second
/// occurrence.
///
/// # Errors
///
/// Returns [`PipelineError`] if the CSV cannot be read or a sink fails.
pub fn validate_sheet<R: Read>(
    reader: R,
    sinks: SinkSet<'_, CanonicalSpace>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, PipelineError> {
    let mut sinks = sinks;
    let mut summary = RunSummary::new();
    let mut stage = ValidateStage::new();
    let mut csv_reader = csv::Reader::from_reader(reader);

    for (i, result) in csv_reader.deserialize::<SheetRow>().enumerate() {
        let row_number = i as u64 + 2;
        summary.lines_read += 1;
        progress.inc(1);

        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Row {row_number}: {e}");
                summary.record_parse_warning(row_number, e.to_string());
                continue;
            }
        };
        summary.features_seen += 1;

        let label = row
            .space_id
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("row {row_number}"));

        let outcome = match check_row(row) {
            Ok(space) => stage.process(space),
            Err(errors) => StageOutcome::Invalid(errors),
        };

        match outcome {
            StageOutcome::Emit(space) => {
                sinks.write(&space);
                summary.emitted += 1;
            }
            StageOutcome::Skip => summary.skipped += 1,
            StageOutcome::Invalid(errors) => summary.record_validation_failure(label, errors),
        }
    }

    progress.finish(format!("{} rows checked", summary.lines_read));
    sinks.finish()?;

    Ok(summary)
}

/// One spreadsheet row, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetRecord {
    pub space_id: String,
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    pub name: String,
    pub location: String,
    pub url: String,
    pub description: String,
    /// `GeoJSON` Point geometry as compact JSON text.
    pub geometry: String,
}

impl SheetRecord {
    /// CSV header matching the serialized field order.
    pub const COLUMNS: &[&str] = &[
        "space_id",
        "type",
        "name",
        "location",
        "url",
        "description",
        "geometry",
    ];
}

/// Gives every record a unique `space_id` and flattens it to a
/// [`SheetRecord`].
///
/// Records that already carry an id keep it (made unique if taken);
/// others get one suggested from their type and name.
#[derive(Debug, Default)]
pub struct AssignIdsStage {
    allocator: SlugAllocator,
}

impl AssignIdsStage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for AssignIdsStage {
    type Output = SheetRecord;

    fn process(&mut self, space: CanonicalSpace) -> StageOutcome<SheetRecord> {
        let name = space.name.clone().unwrap_or_default();
        let suggested = match space.space_id.as_deref().filter(|id| !id.is_empty()) {
            Some(existing) => existing.to_string(),
            None => suggest_space_id(space.space_type, &name),
        };
        let space_id = self.allocator.allocate(&suggested);

        let geometry = serde_json::json!({
            "type": "Point",
            "coordinates": [
                round_ordinate(space.longitude, COORDINATE_PRECISION),
                round_ordinate(space.latitude, COORDINATE_PRECISION),
            ],
        });

        StageOutcome::Emit(SheetRecord {
            space_id,
            space_type: space.space_type,
            name,
            location: space.location.unwrap_or_default(),
            url: space.url.unwrap_or_default(),
            description: space.description.unwrap_or_default(),
            geometry: geometry.to_string(),
        })
    }
}
