//! Anonymous Google Cloud Storage backend.
//!
//! Source rasters live in public GCS buckets, so reads and listings go
//! through the unauthenticated HTTPS endpoints: objects at
//! `https://storage.googleapis.com/<bucket>/<key>` and listings through
//! the JSON API with `prefix`/`pageToken` pagination. Writes are not
//! supported anonymously.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use eo_common::uri::ParsedUri;
use eo_common::{EoError, EoResult};

use crate::backend::{StorageBackend, WriteOptions};

pub struct GcsBackend {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    items: Vec<ListEntry>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
}

impl GcsBackend {
    pub fn anonymous() -> EoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EoError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn split(uri: &str) -> EoResult<(String, String)> {
        let parsed = ParsedUri::parse(uri);
        if parsed.host.is_empty() {
            return Err(EoError::StorageAccess(format!(
                "GCS location has no bucket: {}",
                uri
            )));
        }
        Ok((parsed.host, parsed.path))
    }

    fn object_url(bucket: &str, key: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", bucket, key)
    }

    /// Listing prefix for a directory-like key. The trailing slash keeps
    /// a sibling prefix sharing the same stem (e.g. `L2-RSM-DX` next to
    /// `L2-RSM-D`) out of the results.
    fn dir_prefix(key: &str) -> String {
        if key.is_empty() {
            String::new()
        } else {
            format!("{}/", key.trim_end_matches('/'))
        }
    }

    /// List object names under a prefix, following pagination tokens.
    async fn list_prefix(&self, bucket: &str, prefix: &str, max_pages: Option<usize>) -> EoResult<Vec<String>> {
        let list_url = format!("https://storage.googleapis.com/storage/v1/b/{}/o", bucket);

        let mut names = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut request = self.client.get(&list_url).query(&[("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| EoError::StorageAccess(format!("GCS list failed: {}", e)))?
                .error_for_status()
                .map_err(|e| EoError::StorageAccess(format!("GCS list failed: {}", e)))?;

            let page: ListPage = response
                .json()
                .await
                .map_err(|e| EoError::StorageAccess(format!("GCS list body invalid: {}", e)))?;

            names.extend(page.items.into_iter().map(|e| e.name));
            pages += 1;

            match (page.next_page_token, max_pages) {
                (Some(_), Some(limit)) if pages >= limit => break,
                (Some(token), _) => page_token = Some(token),
                (None, _) => break,
            }
        }

        debug!(bucket = %bucket, prefix = %prefix, count = names.len(), "Listed GCS prefix");
        Ok(names)
    }
}

#[async_trait]
impl StorageBackend for GcsBackend {
    async fn exists(&self, uri: &str) -> EoResult<bool> {
        if self.is_file(uri).await? {
            return Ok(true);
        }
        self.is_dir(uri).await
    }

    async fn is_file(&self, uri: &str) -> EoResult<bool> {
        let (bucket, key) = Self::split(uri)?;
        let response = self
            .client
            .head(Self::object_url(&bucket, &key))
            .send()
            .await
            .map_err(|e| EoError::StorageAccess(format!("GCS head failed: {}", e)))?;
        Ok(response.status().is_success())
    }

    async fn is_dir(&self, uri: &str) -> EoResult<bool> {
        let (bucket, key) = Self::split(uri)?;
        let prefix = Self::dir_prefix(&key);
        let names = self.list_prefix(&bucket, &prefix, Some(1)).await?;
        Ok(!names.is_empty())
    }

    async fn walk(&self, uri: &str) -> EoResult<Vec<String>> {
        let (bucket, key) = Self::split(uri)?;
        let prefix = Self::dir_prefix(&key);
        let names = self.list_prefix(&bucket, &prefix, None).await?;
        Ok(names
            .into_iter()
            .map(|name| format!("gs://{}/{}", bucket, name))
            .collect())
    }

    async fn read(&self, uri: &str) -> EoResult<Bytes> {
        let (bucket, key) = Self::split(uri)?;
        let response = self
            .client
            .get(Self::object_url(&bucket, &key))
            .send()
            .await
            .map_err(|e| EoError::StorageAccess(format!("GCS read failed: {}", e)))?
            .error_for_status()
            .map_err(|e| EoError::StorageAccess(format!("GCS read failed: {}", e)))?;

        response
            .bytes()
            .await
            .map_err(|e| EoError::StorageAccess(format!("GCS read failed: {}", e)))
    }

    async fn write(&self, uri: &str, _data: Bytes, _options: &WriteOptions) -> EoResult<()> {
        Err(EoError::NotSupported(format!(
            "Anonymous GCS access is read-only, cannot write {}",
            uri
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_prefix_excludes_sibling_stems() {
        let prefix = GcsBackend::dir_prefix("DATA/WAPOR-3/MAPSET/L2-RSM-D");
        assert_eq!(prefix, "DATA/WAPOR-3/MAPSET/L2-RSM-D/");
        assert!(!"DATA/WAPOR-3/MAPSET/L2-RSM-DX/x.tif".starts_with(&prefix));

        assert_eq!(GcsBackend::dir_prefix("a/b/"), "a/b/");
        assert_eq!(GcsBackend::dir_prefix(""), "");
    }
}
