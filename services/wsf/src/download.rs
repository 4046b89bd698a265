//! HTTP fetches from the WSF provider's download service.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;

use eo_common::{EoError, EoResult};

/// Base URL of the provider's download service.
pub const PROVIDER_BASE_URL: &str = "https://download.geoservice.dlr.de";

/// Download client for the provider's tile folders. Failures are not
/// retried; the batch is idempotent and re-running it picks up where
/// the failed unit left off.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> EoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EoError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// URL of a file inside one tile folder on the download service.
    pub fn tile_file_url(&self, source_folder: &str, folder_name: &str, filename: &str) -> String {
        format!(
            "{}/{}/files/{}/{}",
            PROVIDER_BASE_URL, source_folder, folder_name, filename
        )
    }

    pub async fn fetch_json(&self, url: &str) -> EoResult<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EoError::Network(format!("Request to {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| EoError::Network(format!("Request to {} failed: {}", url, e)))?;
        response
            .json()
            .await
            .map_err(|e| EoError::Network(format!("Invalid JSON from {}: {}", url, e)))
    }

    /// Stream a file to disk without buffering it whole in memory.
    pub async fn download_to_file(&self, url: &str, path: &Path) -> EoResult<()> {
        info!(url = %url, "Downloading file");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EoError::Network(format!("Request to {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| EoError::Network(format!("Request to {} failed: {}", url, e)))?;

        let mut file = File::create(path).await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to create {}: {}", path.display(), e))
        })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| EoError::Network(format!("Stream from {} failed: {}", url, e)))?;
            file.write_all(&chunk).await.map_err(|e| {
                EoError::StorageAccess(format!("Failed to write {}: {}", path.display(), e))
            })?;
        }
        file.flush().await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_file_url() {
        let downloader = Downloader::new().unwrap();
        assert_eq!(
            downloader.tile_file_url("WSF2015", "WSF2015_v2_10_-20", "WSF2015_v2_10_-20.tif"),
            "https://download.geoservice.dlr.de/WSF2015/files/WSF2015_v2_10_-20/WSF2015_v2_10_-20.tif"
        );
    }
}
