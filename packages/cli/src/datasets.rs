//! Dataset commands: listing, download, centroid reduction, combining.

use std::path::PathBuf;
use std::time::Instant;

use public_space_cli_utils::{IndicatifProgress, MultiProgress};
use public_space_pipeline::{CountSink, NdjsonSink, SinkSet};
use public_space_source::centroids::reduce_file;
use public_space_source::combine::combine_sources;
use public_space_source::fetch::{HttpFetcher, fetch_all};
use public_space_source::registry::{all_sources, enabled_sources};
use public_space_source::SourceDefinition;

use crate::config::Config;

fn selected(config: &Config, flag: Option<&str>) -> Vec<SourceDefinition> {
    let sources = enabled_sources(flag.or(config.sources.as_deref()));
    log::info!(
        "Using {} source(s): {}",
        sources.len(),
        sources
            .iter()
            .map(SourceDefinition::id)
            .collect::<Vec<_>>()
            .join(", ")
    );
    sources
}

pub fn list_sources() {
    let sources = all_sources();
    println!("{:<34} {:<6} {:<10} NAME", "ID", "TYPE", "CENTROIDS");
    println!("{}", "-".repeat(80));
    for source in &sources {
        println!(
            "{:<34} {:<6} {:<10} {}",
            source.id(),
            source.space_type.as_ref(),
            if source.centroids { "yes" } else { "no" },
            source.name
        );
    }
}

pub async fn fetch(
    config: &Config,
    flag: Option<&str>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = selected(config, flag);
    let fetcher = HttpFetcher::new()?;
    let progress = IndicatifProgress::steps_bar(multi, "Downloading", sources.len() as u64);

    let start = Instant::now();
    let paths = fetch_all(
        &fetcher,
        &sources,
        &config.data_dir,
        config.fetch_timeout,
        &progress,
    )
    .await?;

    log::info!(
        "Downloaded {} dataset(s) in {:.1}s",
        paths.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

pub fn centroids(config: &Config, flag: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    for source in selected(config, flag).iter().filter(|s| s.centroids) {
        let input = source.raw_path(&config.data_dir);
        let output = source.centroid_path(&config.data_dir);
        let count = reduce_file(&input, &output)?;
        log::info!("[{}] {count} centroids -> {}", source.id, output.display());
    }

    Ok(())
}

pub fn combine(
    config: &Config,
    flag: Option<&str>,
    output: Option<PathBuf>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let sources = selected(config, flag);
    let output = output.unwrap_or_else(|| config.data_path("combined.ndjson"));

    let mut ndjson = NdjsonSink::create(&output)?;
    let mut count = CountSink::new();
    let sinks = SinkSet::new()
        .with("ndjson", &mut ndjson)
        .with("count", &mut count);

    let progress = IndicatifProgress::steps_bar(multi, "Combining", sources.len() as u64);
    let summary = combine_sources(&config.data_dir, &sources, sinks, &progress)?;

    summary.log("combine");
    log::info!("Wrote {} spaces to {}", count.count(), output.display());

    Ok(())
}
