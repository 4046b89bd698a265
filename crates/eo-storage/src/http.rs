//! Plain HTTP(S) backend for raster locations behind ordinary web
//! servers. Existence maps to a HEAD probe; directories and listings
//! have no HTTP equivalent.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use eo_common::{EoError, EoResult};

use crate::backend::{StorageBackend, WriteOptions};

pub struct HttpBackend {
    client: Client,
}

impl HttpBackend {
    pub fn new() -> EoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EoError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StorageBackend for HttpBackend {
    async fn exists(&self, uri: &str) -> EoResult<bool> {
        self.is_file(uri).await
    }

    async fn is_file(&self, uri: &str) -> EoResult<bool> {
        let response = self
            .client
            .head(uri)
            .send()
            .await
            .map_err(|e| EoError::Network(format!("HEAD {} failed: {}", uri, e)))?;
        Ok(response.status().is_success())
    }

    async fn is_dir(&self, _uri: &str) -> EoResult<bool> {
        Ok(false)
    }

    async fn walk(&self, uri: &str) -> EoResult<Vec<String>> {
        Err(EoError::NotSupported(format!(
            "HTTP locations cannot be listed: {}",
            uri
        )))
    }

    async fn read(&self, uri: &str) -> EoResult<Bytes> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| EoError::Network(format!("GET {} failed: {}", uri, e)))?
            .error_for_status()
            .map_err(|e| EoError::Network(format!("GET {} failed: {}", uri, e)))?;

        response
            .bytes()
            .await
            .map_err(|e| EoError::Network(format!("GET {} failed: {}", uri, e)))
    }

    async fn write(&self, uri: &str, _data: Bytes, _options: &WriteOptions) -> EoResult<()> {
        Err(EoError::NotSupported(format!(
            "HTTP locations are read-only: {}",
            uri
        )))
    }
}
