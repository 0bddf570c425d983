//! Dataset download.
//!
//! Every dataset in a batch is downloaded concurrently to a `.part` file.
//! Only when all of them succeed within the timeout are the parts renamed
//! over the previous downloads, so a failed batch leaves existing files
//! as they were.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt as _;
use public_space_pipeline::progress::ProgressCallback;
use tokio::io::AsyncWriteExt as _;

use crate::SourceError;
use crate::source_def::SourceDefinition;

/// Downloads one dataset to a local file.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Writes the dataset behind `source` to `dest`, returning the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the download or the write fails.
    async fn fetch(&self, source: &SourceDefinition, dest: &Path) -> Result<u64, SourceError>;
}

/// [`DatasetFetcher`] over plain HTTP(S).
///
/// The response body is streamed to disk.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be built.
    pub fn new() -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent("public-space-pipeline/0.1")
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DatasetFetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceDefinition, dest: &Path) -> Result<u64, SourceError> {
        log::info!("[{}] Downloading {}", source.id, source.url);

        let response = self.client.get(&source.url).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus {
                url: source.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
        }
        file.flush().await?;

        #[allow(clippy::cast_precision_loss)]
        let mb = downloaded as f64 / 1_048_576.0;
        log::info!("[{}] download complete: {mb:.1} MB", source.id);

        Ok(downloaded)
    }
}

fn part_path(source: &SourceDefinition, dir: &Path) -> PathBuf {
    dir.join(format!("{}.geojson.part", source.id))
}

async fn remove_parts(sources: &[SourceDefinition], dir: &Path) {
    for source in sources {
        let _ = tokio::fs::remove_file(part_path(source, dir)).await;
    }
}

/// Downloads every source into `dir` as `<id>.geojson`.
///
/// Fetches run concurrently and are joined with an all-or-nothing barrier
/// under one `timeout`: if any fetch fails or the timeout elapses, no
/// existing file is replaced and the error is returned.
///
/// # Errors
///
/// Returns [`SourceError::Timeout`] if the batch does not finish in time,
/// or the first fetch error.
pub async fn fetch_all<F>(
    fetcher: &F,
    sources: &[SourceDefinition],
    dir: &Path,
    timeout: Duration,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<PathBuf>, SourceError>
where
    F: DatasetFetcher + ?Sized,
{
    tokio::fs::create_dir_all(dir).await?;
    progress.set_total(sources.len() as u64);

    let downloads = sources.iter().map(|source| async move {
        let bytes = fetcher.fetch(source, &part_path(source, dir)).await?;
        progress.inc(1);
        Ok::<_, SourceError>(bytes)
    });

    let outcome = tokio::time::timeout(timeout, futures::future::try_join_all(downloads)).await;

    let sizes = match outcome {
        Ok(Ok(sizes)) => sizes,
        Ok(Err(e)) => {
            remove_parts(sources, dir).await;
            return Err(e);
        }
        Err(_) => {
            remove_parts(sources, dir).await;
            return Err(SourceError::Timeout {
                seconds: timeout.as_secs(),
            });
        }
    };

    for source in sources {
        if !tokio::fs::try_exists(part_path(source, dir)).await.unwrap_or(false) {
            remove_parts(sources, dir).await;
            return Err(SourceError::MissingDownload {
                id: source.id.clone(),
            });
        }
    }

    let mut paths = Vec::with_capacity(sources.len());
    for (source, bytes) in sources.iter().zip(sizes) {
        let dest = source.raw_path(dir);
        if let Err(e) = tokio::fs::rename(part_path(source, dir), &dest).await {
            log::error!("[{}] could not move download into place: {e}", source.id);
            remove_parts(sources, dir).await;
            return Err(e.into());
        }
        log::debug!("[{}] {bytes} bytes -> {}", source.id, dest.display());
        paths.push(dest);
    }

    progress.finish(format!("Downloaded {} datasets", paths.len()));

    Ok(paths)
}
