//! Environment defaults.
//!
//! Every setting can be overridden by the matching global flag.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_STORE: &str = "data/store.json";
const DEFAULT_COLLECTION: &str = "public-spaces-main";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 300;

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub store_path: PathBuf,
    pub collection: String,
    /// Comma-separated source ids; `None` means every source.
    pub sources: Option<String>,
    pub fetch_timeout: Duration,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Reads `PUBLIC_SPACE_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let fetch_timeout_secs = match env_var("PUBLIC_SPACE_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!(
                    "Ignoring PUBLIC_SPACE_FETCH_TIMEOUT_SECS={raw:?}, using {DEFAULT_FETCH_TIMEOUT_SECS}"
                );
                DEFAULT_FETCH_TIMEOUT_SECS
            }),
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Self {
            data_dir: env_var("PUBLIC_SPACE_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            store_path: env_var("PUBLIC_SPACE_STORE")
                .unwrap_or_else(|| DEFAULT_STORE.to_string())
                .into(),
            collection: env_var("PUBLIC_SPACE_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            sources: env_var("PUBLIC_SPACE_SOURCES"),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        }
    }

    /// Path under the data directory.
    #[must_use]
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}
