//! URI scheme handling for raster and descriptor locations.
//!
//! Locations are parsed into (scheme, host, path) once at the boundary;
//! everything downstream branches on the tagged scheme instead of
//! sniffing string prefixes.

use std::fmt;

/// Access scheme for a storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriScheme {
    /// Local filesystem path.
    Local,
    /// S3-compatible object storage (`s3://`).
    S3,
    /// Google Cloud Storage (`gs://` or `gcs://`).
    Gcs,
    /// Plain HTTP(S).
    Http,
}

impl fmt::Display for UriScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriScheme::Local => write!(f, "file"),
            UriScheme::S3 => write!(f, "s3"),
            UriScheme::Gcs => write!(f, "gs"),
            UriScheme::Http => write!(f, "http"),
        }
    }
}

/// A storage location split into scheme, host and path.
///
/// For object storage the host is the bucket name; for local paths it is
/// empty and `path` holds the full filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    pub scheme: UriScheme,
    pub host: String,
    pub path: String,
}

impl ParsedUri {
    /// Parse a location string. Anything without a recognized scheme
    /// prefix is treated as a local filesystem path.
    pub fn parse(uri: &str) -> Self {
        for (prefix, scheme) in [
            ("s3://", UriScheme::S3),
            ("gs://", UriScheme::Gcs),
            ("gcs://", UriScheme::Gcs),
            ("http://", UriScheme::Http),
            ("https://", UriScheme::Http),
        ] {
            if let Some(rest) = uri.strip_prefix(prefix) {
                let (host, path) = match rest.split_once('/') {
                    Some((host, path)) => (host.to_string(), path.to_string()),
                    None => (rest.to_string(), String::new()),
                };
                return Self { scheme, host, path };
            }
        }

        Self {
            scheme: UriScheme::Local,
            host: String::new(),
            path: uri.to_string(),
        }
    }

    /// Rebuild the full URI string.
    pub fn to_uri(&self) -> String {
        match self.scheme {
            UriScheme::Local => self.path.clone(),
            UriScheme::S3 => format!("s3://{}/{}", self.host, self.path),
            UriScheme::Gcs => format!("gs://{}/{}", self.host, self.path),
            // Scheme detail (http vs https) is not preserved; public
            // object endpoints are all https.
            UriScheme::Http => format!("https://{}/{}", self.host, self.path),
        }
    }
}

const GCS_PUBLIC_PREFIX: &str = "https://storage.googleapis.com/";

/// Rewrite a public `https://storage.googleapis.com/<bucket>/...` URL to
/// its `gs://<bucket>/...` form. Pure string substitution; names are not
/// resolved against bucket ACLs. Non-matching inputs pass through.
pub fn to_gs_form(uri: &str) -> String {
    match uri.strip_prefix(GCS_PUBLIC_PREFIX) {
        Some(rest) => format!("gs://{}", rest),
        None => uri.to_string(),
    }
}

/// Inverse of [`to_gs_form`]: rewrite `gs://` (or `gcs://`) locations to
/// the public HTTPS endpoint. Non-GCS inputs pass through.
pub fn to_public_form(uri: &str) -> String {
    if let Some(rest) = uri.strip_prefix("gs://") {
        format!("{}{}", GCS_PUBLIC_PREFIX, rest)
    } else if let Some(rest) = uri.strip_prefix("gcs://") {
        format!("{}{}", GCS_PUBLIC_PREFIX, rest)
    } else {
        uri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schemes() {
        let s3 = ParsedUri::parse("s3://deafrica-data/wapor-v3/item.json");
        assert_eq!(s3.scheme, UriScheme::S3);
        assert_eq!(s3.host, "deafrica-data");
        assert_eq!(s3.path, "wapor-v3/item.json");

        let gs = ParsedUri::parse("gs://fao-gismgr-wapor-3-data/DATA");
        assert_eq!(gs.scheme, UriScheme::Gcs);
        assert_eq!(gs.host, "fao-gismgr-wapor-3-data");

        let http = ParsedUri::parse("https://download.geoservice.dlr.de/WSF2015/files");
        assert_eq!(http.scheme, UriScheme::Http);
        assert_eq!(http.host, "download.geoservice.dlr.de");

        let local = ParsedUri::parse("/tmp/wapor_soil_moisture");
        assert_eq!(local.scheme, UriScheme::Local);
        assert_eq!(local.path, "/tmp/wapor_soil_moisture");
    }

    #[test]
    fn test_gs_rewrite_round_trip() {
        let public = "https://storage.googleapis.com/fao-gismgr-wapor-3-data/DATA/x.tif";
        let gs = to_gs_form(public);
        assert_eq!(gs, "gs://fao-gismgr-wapor-3-data/DATA/x.tif");
        assert_eq!(to_public_form(&gs), public);
    }

    #[test]
    fn test_rewrite_passthrough() {
        assert_eq!(to_gs_form("s3://bucket/key"), "s3://bucket/key");
        assert_eq!(to_public_form("/local/file.tif"), "/local/file.tif");
    }

    #[test]
    fn test_to_uri_round_trip() {
        for uri in ["s3://b/k/x.json", "gs://b/k.tif"] {
            assert_eq!(ParsedUri::parse(uri).to_uri(), uri);
        }
    }
}
