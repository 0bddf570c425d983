//! Record commands over canonical NDJSON files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geojson::GeoJson;
use public_space_cli_utils::{IndicatifProgress, MultiProgress};
use public_space_geometry::BoroughIndex;
use public_space_models::CanonicalSpace;
use public_space_pipeline::{
    AssignIdsStage, CommandOracle, CsvSink, DescribeStage, DescriptionChange, NdjsonSink,
    SheetRecord, SinkSet, ValidateStage, run_stage, validate_sheet,
};
use public_space_spatial_join::{
    BoroughCheckStage, BoroughChecker, BoroughMismatch, ReferenceSet, SchoolyardEnricher,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn open(path: &Path) -> CliResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(BufReader::new(file))
}

fn load_geojson(path: &Path) -> CliResult<GeoJson> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(text.parse::<GeoJson>()?)
}

fn csv_sink(path: &Path, columns: &[&str], append: bool) -> CliResult<CsvSink<File>> {
    let sink = if append {
        CsvSink::append(path, columns)?
    } else {
        CsvSink::create(path, columns)?
    };
    Ok(sink)
}

/// Returns `false` when any record failed validation.
pub fn validate(input: &Path, output: Option<&Path>, multi: &MultiProgress) -> CliResult<bool> {
    let mut ndjson = output.map(NdjsonSink::create).transpose()?;
    let mut sinks: SinkSet<'_, CanonicalSpace> = SinkSet::new();
    if let Some(sink) = ndjson.as_mut() {
        sinks.add("ndjson", sink);
    }

    let progress = IndicatifProgress::records_bar(multi, "Validating");
    let is_sheet = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let summary = if is_sheet {
        validate_sheet(open(input)?, sinks, &progress)?
    } else {
        run_stage(open(input)?, &mut ValidateStage::new(), sinks, &progress)?
    };

    summary.log("validate");

    Ok(!summary.has_validation_errors())
}

pub fn check_boroughs(
    input: &Path,
    boroughs: &Path,
    name_property: &str,
    output: &Path,
    append: bool,
    multi: &MultiProgress,
) -> CliResult<()> {
    let index = BoroughIndex::from_geojson(&load_geojson(boroughs)?, name_property)?;
    log::info!("Loaded {} borough polygons", index.len());

    let mut csv = csv_sink(output, BoroughMismatch::COLUMNS, append)?;
    let sinks = SinkSet::new().with("mismatches", &mut csv);
    let mut stage = BoroughCheckStage::new(BoroughChecker::new(index));

    let progress = IndicatifProgress::records_bar(multi, "Checking boroughs");
    let summary = run_stage(open(input)?, &mut stage, sinks, &progress)?;

    summary.log("check-boroughs");
    log::info!("{} mismatches written to {}", summary.emitted, output.display());

    Ok(())
}

pub fn enrich_schoolyards(
    input: &Path,
    schools: &Path,
    name_property: &str,
    output: &Path,
    multi: &MultiProgress,
) -> CliResult<()> {
    let schools = ReferenceSet::load(&load_geojson(schools)?, name_property)?;
    if schools.is_empty() {
        log::warn!("No schools loaded; every schoolyard will be named Unknown");
    }

    let mut ndjson = NdjsonSink::create(output)?;
    let sinks = SinkSet::new().with("ndjson", &mut ndjson);
    let mut stage = SchoolyardEnricher::new(schools);

    let progress = IndicatifProgress::records_bar(multi, "Enriching schoolyards");
    let summary = run_stage(open(input)?, &mut stage, sinks, &progress)?;

    summary.log("enrich-schoolyards");

    Ok(())
}

pub fn describe(
    input: &Path,
    output: &Path,
    append: bool,
    command: Vec<String>,
    multi: &MultiProgress,
) -> CliResult<()> {
    let mut command = command.into_iter();
    let program = command.next().ok_or("describe needs a command to run")?;
    let oracle = CommandOracle::new(program, command.collect());

    let mut csv = csv_sink(output, DescriptionChange::COLUMNS, append)?;
    let sinks = SinkSet::new().with("descriptions", &mut csv);
    let mut stage = DescribeStage::new(oracle);

    let progress = IndicatifProgress::records_bar(multi, "Describing");
    let summary = run_stage(open(input)?, &mut stage, sinks, &progress)?;

    summary.log("describe");
    log::info!("{} description changes written to {}", summary.emitted, output.display());

    Ok(())
}

pub fn to_sheet(input: &Path, output: &Path, multi: &MultiProgress) -> CliResult<()> {
    let mut csv = CsvSink::create(output, SheetRecord::COLUMNS)?;
    let sinks = SinkSet::new().with("sheet", &mut csv);

    let progress = IndicatifProgress::records_bar(multi, "Building sheet");
    let summary = run_stage(open(input)?, &mut AssignIdsStage::new(), sinks, &progress)?;

    summary.log("to-sheet");
    log::info!("{} rows written to {}", summary.emitted, output.display());

    Ok(())
}
