//! Puzzle image download.
//!
//! Downloads are streamed into `temp_<unix-micros>.jpg` inside the
//! configured directory. Any failure yields the static fallback image
//! instead of an error.

use crate::config::ImageConfig;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// File-name prefix marking a downloaded, deletable image.
pub const TEMP_IMAGE_PREFIX: &str = "temp_";

/// Result of an image retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievedImage {
    /// Freshly downloaded temporary file; delete after dispatch.
    Downloaded(PathBuf),
    /// The pre-existing static fallback image.
    Fallback(PathBuf),
}

impl RetrievedImage {
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded(p) | Self::Fallback(p) => p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Returns `true` if `path` follows the temporary-download naming convention.
pub fn is_temporary_image(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(TEMP_IMAGE_PREFIX))
}

/// Build a temporary file name from the current time in microseconds.
pub fn temp_image_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("{TEMP_IMAGE_PREFIX}{}.jpg", now.timestamp_micros())
}

/// Downloads puzzle images, falling back to a static asset.
pub struct ImageRetriever {
    client: reqwest::Client,
    temp_dir: PathBuf,
    fallback_path: PathBuf,
}

impl ImageRetriever {
    pub fn new(config: &ImageConfig, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            temp_dir: config.temp_dir.clone(),
            fallback_path: config.fallback_path.clone(),
        }
    }

    /// Download `url` to a temporary file. Never fails.
    pub async fn retrieve(&self, url: Option<&str>) -> RetrievedImage {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            warn!("puzzle has no image URL, using fallback image");
            return RetrievedImage::Fallback(self.fallback_path.clone());
        };

        let target = self.temp_dir.join(temp_image_name(chrono::Utc::now()));
        match self.download(url, &target).await {
            Ok(bytes) => {
                debug!("downloaded {bytes} bytes to {}", target.display());
                RetrievedImage::Downloaded(target)
            }
            Err(e) => {
                warn!("image download failed: {e}");
                RetrievedImage::Fallback(self.fallback_path.clone())
            }
        }
    }

    async fn download(&self, url: &str, target: &Path) -> crate::Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| crate::BotError::Image(e.to_string()))?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .await?;

        let written = write_body(&mut file, response).await;
        if written.is_err() {
            drop(file);
            let _ = tokio::fs::remove_file(target).await;
        }
        written
    }
}

async fn write_body(file: &mut tokio::fs::File, response: reqwest::Response) -> crate::Result<u64> {
    let mut stream = response.bytes_stream();
    let mut total = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| crate::BotError::Image(e.to_string()))?;
        file.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(total)
}
