#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for pipeline progress and logging.
//!
//! [`init_logger`] installs `pretty_env_logger` behind
//! `indicatif-log-bridge`, so log lines are printed above the progress
//! bars instead of tearing through them. Bars are handed to pipeline code
//! as [`ProgressCallback`] trait objects.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use public_space_pipeline::progress::ProgressCallback;

pub use indicatif::MultiProgress;

const RECORDS_SPINNER: &str = "{spinner:.cyan} {msg} {pos} records [{elapsed}]";
const RECORDS_BAR: &str = "  {msg} {wide_bar:.cyan/dim} {pos}/{len} {percent}% [{eta}]";
const STEPS_BAR: &str = "{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]";

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

/// [`ProgressCallback`] backed by an `indicatif` bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied when a total becomes known.
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Bar for a record stream.
    ///
    /// Line-delimited inputs have no known length, so this counts records
    /// on a spinner until [`ProgressCallback::set_total`] is called (as the
    /// sheet and fetch steps do).
    #[must_use]
    pub fn records_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_style(
            ProgressStyle::with_template(RECORDS_SPINNER)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        Arc::new(Self {
            bar,
            sized_style: bar_style(RECORDS_BAR),
        })
    }

    /// Bar for a fixed number of steps, such as datasets in a batch.
    #[must_use]
    pub fn steps_bar(multi: &MultiProgress, message: &str, total: u64) -> Arc<dyn ProgressCallback> {
        let sized_style = bar_style(STEPS_BAR);
        let bar = multi.add(ProgressBar::new(total));
        bar.set_style(sized_style.clone());
        bar.set_message(message.to_string());

        Arc::new(Self { bar, sized_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.sized_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs the global logger (level from `RUST_LOG`, default `info`) and
/// returns the [`MultiProgress`] every bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let logger = builder.build();
    let level = logger.filter();

    // Already installed when called twice in one process.
    let _ = indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init();

    log::set_max_level(level);

    multi
}
