//! Local filesystem backend.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use eo_common::{EoError, EoResult};

use crate::backend::{StorageBackend, WriteOptions};

/// Plain filesystem storage. Content type and ACL options are accepted
/// and ignored; parent directories are created on write.
#[derive(Debug, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn exists(&self, uri: &str) -> EoResult<bool> {
        Ok(fs::try_exists(uri).await?)
    }

    async fn is_file(&self, uri: &str) -> EoResult<bool> {
        match fs::metadata(uri).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_dir(&self, uri: &str) -> EoResult<bool> {
        match fs::metadata(uri).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn walk(&self, uri: &str) -> EoResult<Vec<String>> {
        if !fs::try_exists(uri).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(uri) {
            let entry = entry.map_err(|e| EoError::StorageAccess(e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.path().display().to_string());
            }
        }
        Ok(files)
    }

    async fn read(&self, uri: &str) -> EoResult<Bytes> {
        Ok(Bytes::from(fs::read(uri).await?))
    }

    async fn write(&self, uri: &str, data: Bytes, _options: &WriteOptions) -> EoResult<()> {
        if let Some(parent) = Path::new(uri).parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(uri, &data).await?;
        debug!(path = %uri, size = data.len(), "Wrote local file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_walk() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new();

        let nested = dir.path().join("2023/01/item.stac-item.json");
        let nested = nested.to_str().unwrap();

        assert!(!backend.exists(nested).await.unwrap());
        backend
            .write(nested, Bytes::from_static(b"{}"), &WriteOptions::json())
            .await
            .unwrap();

        assert!(backend.exists(nested).await.unwrap());
        assert!(backend.is_file(nested).await.unwrap());
        assert!(!backend.is_dir(nested).await.unwrap());
        assert!(backend.is_dir(dir.path().to_str().unwrap()).await.unwrap());
        assert_eq!(backend.read(nested).await.unwrap(), Bytes::from_static(b"{}"));

        let files = backend.walk(dir.path().to_str().unwrap()).await.unwrap();
        assert_eq!(files, vec![nested.to_string()]);
    }

    #[tokio::test]
    async fn test_walk_missing_prefix_is_empty() {
        let backend = LocalBackend::new();
        let files = backend.walk("/nonexistent/prefix/for/tests").await.unwrap();
        assert!(files.is_empty());
    }
}
