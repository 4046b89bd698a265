//! Storage backends for the EO STAC services.
//!
//! A closed set of tagged backends (local filesystem, S3, anonymous GCS,
//! plain HTTP) behind one capability trait. The backend is selected once
//! at the boundary from the location's URI scheme; nothing downstream
//! re-dispatches on string prefixes.

pub mod backend;
pub mod gcs;
pub mod http;
pub mod local;
pub mod s3;

pub use backend::{for_uri, ObjectAcl, StorageBackend, WriteOptions};
pub use gcs::GcsBackend;
pub use http::HttpBackend;
pub use local::LocalBackend;
pub use s3::S3Backend;
