//! S3-compatible object storage backend.
//!
//! Uses the AWS SDK rather than a generic object-store layer because
//! descriptor and data uploads must carry a per-object canned ACL
//! (`bucket-owner-full-control`) and an explicit content type.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use eo_common::uri::ParsedUri;
use eo_common::{EoError, EoResult};

use crate::backend::{ObjectAcl, StorageBackend, WriteOptions};

pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    /// Build a client from the ambient AWS environment (credentials,
    /// region, endpoint overrides).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn split(uri: &str) -> EoResult<(String, String)> {
        let parsed = ParsedUri::parse(uri);
        if parsed.host.is_empty() {
            return Err(EoError::StorageAccess(format!(
                "S3 location has no bucket: {}",
                uri
            )));
        }
        Ok((parsed.host, parsed.path))
    }

    async fn head(&self, uri: &str) -> EoResult<bool> {
        let (bucket, key) = Self::split(uri)?;
        match self
            .client
            .head_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(EoError::StorageAccess(format!(
                        "Failed to check s3://{}/{}: {}",
                        bucket, key, service_error
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn exists(&self, uri: &str) -> EoResult<bool> {
        if self.head(uri).await? {
            return Ok(true);
        }
        self.is_dir(uri).await
    }

    async fn is_file(&self, uri: &str) -> EoResult<bool> {
        self.head(uri).await
    }

    async fn is_dir(&self, uri: &str) -> EoResult<bool> {
        let (bucket, key) = Self::split(uri)?;
        let prefix = format!("{}/", key.trim_end_matches('/'));

        let response = self
            .client
            .list_objects_v2()
            .bucket(&bucket)
            .prefix(&prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| {
                EoError::StorageAccess(format!("Failed to list s3://{}/{}: {}", bucket, prefix, e))
            })?;

        Ok(!response.contents().is_empty())
    }

    async fn walk(&self, uri: &str) -> EoResult<Vec<String>> {
        let (bucket, key) = Self::split(uri)?;

        let mut paths = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&bucket)
            .prefix(&key)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                EoError::StorageAccess(format!("Failed to list s3://{}/{}: {}", bucket, key, e))
            })?;
            for object in page.contents() {
                if let Some(object_key) = object.key() {
                    paths.push(format!("s3://{}/{}", bucket, object_key));
                }
            }
        }

        Ok(paths)
    }

    async fn read(&self, uri: &str) -> EoResult<Bytes> {
        let (bucket, key) = Self::split(uri)?;
        let response = self
            .client
            .get_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                EoError::StorageAccess(format!("Failed to read s3://{}/{}: {}", bucket, key, e))
            })?;

        let data = response.body.collect().await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to read s3://{}/{}: {}", bucket, key, e))
        })?;
        Ok(data.into_bytes())
    }

    async fn write(&self, uri: &str, data: Bytes, options: &WriteOptions) -> EoResult<()> {
        let (bucket, key) = Self::split(uri)?;
        let size = data.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(ByteStream::from(data));

        if let Some(content_type) = &options.content_type {
            request = request.content_type(content_type);
        }
        if options.acl == ObjectAcl::BucketOwnerFullControl {
            request = request.acl(ObjectCannedAcl::BucketOwnerFullControl);
        }

        request.send().await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to write s3://{}/{}: {}", bucket, key, e))
        })?;

        debug!(bucket = %bucket, key = %key, size, "Wrote object");
        Ok(())
    }
}
