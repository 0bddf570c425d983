//! Per-record stages and the run loop.

use std::io::BufRead;
use std::sync::Arc;

use public_space_models::CanonicalSpace;

use crate::PipelineError;
use crate::feature::feature_to_space;
use crate::progress::ProgressCallback;
use crate::reader::{FeatureEvent, FeatureLines};
use crate::sink::SinkSet;
use crate::summary::RunSummary;
use crate::validate::ValidationError;

/// Result of running one record through a [`Stage`].
#[derive(Debug)]
pub enum StageOutcome<T> {
    /// Pass `T` on to the sinks.
    Emit(T),
    /// Drop the record without complaint.
    Skip,
    /// Drop the record and report why.
    Invalid(Vec<ValidationError>),
}

/// A per-record transformation.
pub trait Stage {
    type Output;

    fn process(&mut self, space: CanonicalSpace) -> StageOutcome<Self::Output>;
}

/// Emits every record unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl Stage for PassThrough {
    type Output = CanonicalSpace;

    fn process(&mut self, space: CanonicalSpace) -> StageOutcome<CanonicalSpace> {
        StageOutcome::Emit(space)
    }
}

/// Runs every feature in `reader` through `stage` into `sinks`.
///
/// Processing is strictly sequential. Malformed lines, geometry rejections
/// and invalid records are counted in the returned [`RunSummary`] and the
/// run continues.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] if the reader fails, or the first sink
/// failure once all remaining sinks have been flushed.
pub fn run_stage<R, S>(
    reader: R,
    stage: &mut S,
    sinks: SinkSet<'_, S::Output>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunSummary, PipelineError>
where
    R: BufRead,
    S: Stage,
{
    let mut sinks = sinks;
    let mut summary = RunSummary::new();
    let mut lines = FeatureLines::new(reader);

    for event in &mut lines {
        let (line, feature) = match event? {
            FeatureEvent::Feature { line, feature } => (line, feature),
            FeatureEvent::Malformed { line, message } => {
                log::warn!("Line {line}: {message}");
                summary.record_parse_warning(line, message);
                continue;
            }
        };
        summary.features_seen += 1;
        progress.inc(1);

        let space = match feature_to_space(&feature) {
            Ok(space) => space,
            Err(e) if e.is_geometry() => {
                log::warn!("Line {line}: rejected: {e}");
                summary.geometry_rejections += 1;
                continue;
            }
            Err(e) => {
                log::warn!("Line {line}: {e}");
                summary.record_parse_warning(line, e.to_string());
                continue;
            }
        };

        let label = space.label().to_string();
        match stage.process(space) {
            StageOutcome::Emit(output) => {
                sinks.write(&output);
                summary.emitted += 1;
            }
            StageOutcome::Skip => {
                log::debug!("Line {line}: skipped {label}");
                summary.skipped += 1;
            }
            StageOutcome::Invalid(errors) => {
                log::debug!("Line {line}: {label} failed {} checks", errors.len());
                summary.record_validation_failure(label, errors);
            }
        }
    }

    summary.lines_read = lines.lines_read();
    progress.finish(format!("{} records processed", summary.features_seen));

    sinks.finish()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use public_space_models::SpaceType;

    use super::*;
    use crate::progress::null_progress;
    use crate::sink::{CountSink, NdjsonSink};
    use crate::validate::ValidateStage;

    const THREE_LINES: &str = concat!(
        r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[-73.97,40.77]},"properties":{"type":"park","name":"Sheep Meadow"}}"#,
        "\n",
        r#"{"type":"Feature","geometry":{"type":"Point""#,
        "\n",
        r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]},"properties":{"type":"park"}}"#,
        "\n",
    );

    #[test]
    fn three_line_input_yields_one_space_one_warning_one_rejection() {
        let mut out = NdjsonSink::new(Vec::new());
        let sinks = SinkSet::new().with("ndjson", &mut out);

        let summary =
            run_stage(Cursor::new(THREE_LINES), &mut PassThrough, sinks, &null_progress()).unwrap();

        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.features_seen, 2);
        assert_eq!(summary.emitted, 1);
        assert_eq!(summary.parse_warnings.len(), 1);
        assert_eq!(summary.parse_warnings[0].line, 2);
        assert_eq!(summary.geometry_rejections, 1);

        let written = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.contains("Sheep Meadow"));
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_the_run() {
        let feature = br#"{"type":"Feature","geometry":{"type":"Point","coordinates":[-73.97,40.77]},"properties":{"type":"park","name":"Sheep Meadow"}}"#;
        let mut input = Vec::new();
        input.extend_from_slice(feature);
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(feature);
        input.push(b'\n');

        let mut count = CountSink::new();
        let sinks = SinkSet::new().with("count", &mut count);
        let summary =
            run_stage(Cursor::new(input), &mut PassThrough, sinks, &null_progress()).unwrap();

        assert_eq!(summary.emitted, 2);
        assert_eq!(summary.parse_warnings.len(), 1);
        assert_eq!(summary.parse_warnings[0].line, 2);
        assert_eq!(count.count(), 2);
    }

    #[test]
    fn reports_one_tick_per_feature_and_finishes() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Recorder {
            ticks: Mutex<u64>,
            finished: Mutex<Option<String>>,
        }

        impl ProgressCallback for Recorder {
            fn set_total(&self, _total: u64) {}
            fn inc(&self, delta: u64) {
                *self.ticks.lock().unwrap() += delta;
            }
            fn set_message(&self, _msg: String) {}
            fn finish(&self, msg: String) {
                *self.finished.lock().unwrap() = Some(msg);
            }
        }

        let recorder = Arc::new(Recorder::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        run_stage(Cursor::new(THREE_LINES), &mut PassThrough, SinkSet::new(), &progress).unwrap();

        assert_eq!(*recorder.ticks.lock().unwrap(), 2);
        assert_eq!(
            recorder.finished.lock().unwrap().as_deref(),
            Some("2 records processed")
        );
    }

    #[test]
    fn invalid_records_are_collected_not_written() {
        let input = concat!(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"type":"stp","space_id":"stp-ps-1","name":"PS 1","description":"A schoolyard."}}"#,
            "\n",
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"type":"stp","space_id":"Bad Id","name":"PS 2"}}"#,
            "\n",
        );
        let mut count = CountSink::new();
        let sinks = SinkSet::new().with("count", &mut count);

        let summary =
            run_stage(Cursor::new(input), &mut ValidateStage::new(), sinks, &null_progress())
                .unwrap();

        assert_eq!(summary.emitted, 1);
        assert!(summary.has_validation_errors());
        assert_eq!(summary.validation_failures[0].label, "Bad Id");
        assert_eq!(summary.validation_failures[0].errors.len(), 2);
        assert_eq!(count.count(), 1);
    }

    #[test]
    fn skip_outcomes_are_counted() {
        struct OnlyParks;

        impl Stage for OnlyParks {
            type Output = CanonicalSpace;

            fn process(&mut self, space: CanonicalSpace) -> StageOutcome<CanonicalSpace> {
                if space.space_type == SpaceType::Park {
                    StageOutcome::Emit(space)
                } else {
                    StageOutcome::Skip
                }
            }
        }

        let input = concat!(
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"type":"park"}}"#,
            "\n",
            r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"type":"plaza"}}"#,
            "\n",
        );
        let summary = run_stage(
            Cursor::new(input),
            &mut OnlyParks,
            SinkSet::new(),
            &null_progress(),
        )
        .unwrap();

        assert_eq!(summary.emitted, 1);
        assert_eq!(summary.skipped, 1);
    }
}
