//! The storage capability trait and backend selection.

use async_trait::async_trait;
use bytes::Bytes;

use eo_common::uri::{ParsedUri, UriScheme};
use eo_common::EoResult;

use crate::{GcsBackend, HttpBackend, LocalBackend, S3Backend};

/// Canned ACL applied to written objects, where the backend supports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectAcl {
    #[default]
    Private,
    BucketOwnerFullControl,
}

/// Options for a single write.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub content_type: Option<String>,
    pub acl: ObjectAcl,
}

impl WriteOptions {
    /// Descriptor documents: pretty JSON owned by the bucket owner.
    pub fn json() -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            acl: ObjectAcl::BucketOwnerFullControl,
        }
    }

    /// Raster data files.
    pub fn geotiff() -> Self {
        Self {
            content_type: Some("image/tiff".to_string()),
            acl: ObjectAcl::BucketOwnerFullControl,
        }
    }
}

/// Capability interface over one storage family. All methods take full
/// URIs (or plain paths for the local backend); `walk` returns full URIs
/// of regular files under the prefix.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn exists(&self, uri: &str) -> EoResult<bool>;
    async fn is_file(&self, uri: &str) -> EoResult<bool>;
    async fn is_dir(&self, uri: &str) -> EoResult<bool>;
    /// Recursively list file locations under a prefix. An empty result
    /// is valid; access failures propagate.
    async fn walk(&self, uri: &str) -> EoResult<Vec<String>>;
    async fn read(&self, uri: &str) -> EoResult<Bytes>;
    async fn write(&self, uri: &str, data: Bytes, options: &WriteOptions) -> EoResult<()>;
}

/// Select a backend for a location, once, by URI scheme.
pub async fn for_uri(uri: &str) -> EoResult<Box<dyn StorageBackend>> {
    match ParsedUri::parse(uri).scheme {
        UriScheme::Local => Ok(Box::new(LocalBackend::new())),
        UriScheme::S3 => Ok(Box::new(S3Backend::from_env().await)),
        UriScheme::Gcs => Ok(Box::new(GcsBackend::anonymous()?)),
        UriScheme::Http => Ok(Box::new(HttpBackend::new()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_options() {
        let json = WriteOptions::json();
        assert_eq!(json.content_type.as_deref(), Some("application/json"));
        assert_eq!(json.acl, ObjectAcl::BucketOwnerFullControl);

        let tif = WriteOptions::geotiff();
        assert_eq!(tif.content_type.as_deref(), Some("image/tiff"));

        assert_eq!(WriteOptions::default().acl, ObjectAcl::Private);
    }
}
