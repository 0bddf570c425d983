#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line driver for the NYC public space data pipeline.
//!
//! Typical order: `fetch`, `centroids`, `combine`, then the record steps
//! (`enrich-schoolyards`, `check-boroughs`, `validate`, `to-sheet`),
//! `import` into the store, and finally `export`.
//!
//! Uses `indicatif-log-bridge` (via [`public_space_cli_utils::init_logger`])
//! so log lines and progress bars share the terminal cleanly.

mod config;
mod datasets;
mod records;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "public_space", about = "NYC public space data pipeline")]
struct Cli {
    /// Data directory (overrides `PUBLIC_SPACE_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Document store file (overrides `PUBLIC_SPACE_STORE`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Store collection (overrides `PUBLIC_SPACE_COLLECTION`)
    #[arg(long, global = true)]
    collection: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configured data sources
    Sources,
    /// Download every enabled dataset (all or nothing)
    Fetch {
        /// Comma-separated list of source IDs (overrides `PUBLIC_SPACE_SOURCES`)
        #[arg(long)]
        sources: Option<String>,
        /// Batch timeout in seconds (overrides `PUBLIC_SPACE_FETCH_TIMEOUT_SECS`)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Reduce footprint datasets to centroid points
    Centroids {
        /// Comma-separated list of source IDs
        #[arg(long)]
        sources: Option<String>,
    },
    /// Normalize every dataset into one canonical NDJSON file
    Combine {
        /// Comma-separated list of source IDs
        #[arg(long)]
        sources: Option<String>,
        /// Output file (default: `<data-dir>/combined.ndjson`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate canonical records (NDJSON) or a spreadsheet export (.csv).
    /// Exits with status 1 when any record is invalid.
    Validate {
        input: PathBuf,
        /// Write valid records here as NDJSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Report records whose text names a different borough than their location
    CheckBoroughs {
        input: PathBuf,
        /// Borough boundaries `FeatureCollection`
        #[arg(long)]
        boroughs: PathBuf,
        /// Property holding the borough name
        #[arg(long, default_value = "boro_name")]
        name_property: String,
        /// Mismatch CSV (default: `<data-dir>/borough-mismatches.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Append to an existing CSV instead of replacing it
        #[arg(long)]
        append: bool,
    },
    /// Name schoolyards after their nearest school
    EnrichSchoolyards {
        input: PathBuf,
        /// Schools `FeatureCollection`
        #[arg(long)]
        schools: PathBuf,
        /// Property holding the school name
        #[arg(long, default_value = "Name")]
        name_property: String,
        /// Output NDJSON
        #[arg(long)]
        output: PathBuf,
    },
    /// Ask an external command for improved descriptions
    Describe {
        input: PathBuf,
        /// Change CSV (default: `<data-dir>/descriptions.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Append to an existing CSV instead of replacing it
        #[arg(long)]
        append: bool,
        /// Command run once per feature, e.g. `-- my-describer --model x`
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Flatten canonical records into a spreadsheet with unique ids
    ToSheet {
        input: PathBuf,
        /// Output CSV (default: `<data-dir>/spaces-sheet.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List stored identifiers that are not URL-friendly, and duplicates
    CheckSlugs,
    /// Set one document's `space_id`
    FixSlug {
        /// Store key of the document
        document_id: String,
        /// New identifier (default: the suggested slug)
        slug: Option<String>,
    },
    /// Merge spreadsheet rows into the store
    Import {
        input: PathBuf,
        /// Comma-separated list of columns to copy (default: the standard set)
        #[arg(long)]
        fields: Option<String>,
    },
    /// Export the collection as GeoJSON, NDJSON and CSV
    Export {
        /// Output directory (default: the data directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Base file name
        #[arg(long, default_value = "nyc-public-space")]
        basename: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = public_space_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if let Some(collection) = cli.collection {
        config.collection = collection;
    }

    match cli.command {
        Commands::Sources => datasets::list_sources(),
        Commands::Fetch {
            sources,
            timeout_secs,
        } => {
            if let Some(secs) = timeout_secs {
                config.fetch_timeout = std::time::Duration::from_secs(secs);
            }
            datasets::fetch(&config, sources.as_deref(), &multi).await?;
        }
        Commands::Centroids { sources } => datasets::centroids(&config, sources.as_deref())?,
        Commands::Combine { sources, output } => {
            datasets::combine(&config, sources.as_deref(), output, &multi)?;
        }
        Commands::Validate { input, output } => {
            let valid = records::validate(&input, output.as_deref(), &multi)?;
            if !valid {
                log::error!("Validation failed for {}", input.display());
                std::process::exit(1);
            }
        }
        Commands::CheckBoroughs {
            input,
            boroughs,
            name_property,
            output,
            append,
        } => {
            let output = output.unwrap_or_else(|| config.data_path("borough-mismatches.csv"));
            records::check_boroughs(&input, &boroughs, &name_property, &output, append, &multi)?;
        }
        Commands::EnrichSchoolyards {
            input,
            schools,
            name_property,
            output,
        } => records::enrich_schoolyards(&input, &schools, &name_property, &output, &multi)?,
        Commands::Describe {
            input,
            output,
            append,
            command,
        } => {
            let output = output.unwrap_or_else(|| config.data_path("descriptions.csv"));
            records::describe(&input, &output, append, command, &multi)?;
        }
        Commands::ToSheet { input, output } => {
            let output = output.unwrap_or_else(|| config.data_path("spaces-sheet.csv"));
            records::to_sheet(&input, &output, &multi)?;
        }
        Commands::CheckSlugs => store::check_slugs(&config)?,
        Commands::FixSlug { document_id, slug } => {
            store::fix_slug(&config, &document_id, slug.as_deref())?;
        }
        Commands::Import { input, fields } => store::import(&config, &input, fields.as_deref())?,
        Commands::Export { dir, basename } => {
            let dir = dir.unwrap_or_else(|| config.data_dir.clone());
            store::export(&config, &dir, &basename)?;
        }
    }

    Ok(())
}
