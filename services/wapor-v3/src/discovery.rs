//! Raster discovery for a WaPOR mapset.
//!
//! Two strategies in a fixed fallback order: the catalog API first, then
//! a recursive listing of the mapset's public GCS prefix when the
//! catalog is unreachable or errors. The strategies are not required to
//! agree on ordering or count; callers sort or dedup if they care.
//! Discovered locations are normalized to their `gs://` form.

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use eo_common::uri::to_gs_form;
use eo_common::EoResult;
use eo_storage::StorageBackend;

use crate::catalog::CatalogSource;

/// Base prefix of the WaPOR v3 mapset bucket.
pub const MAPSET_GS_PREFIX: &str = "gs://fao-gismgr-wapor-3-data/DATA/WAPOR-3/MAPSET";

const GEOTIFF_EXTENSIONS: [&str; 3] = ["tif", "tiff", "gtiff"];

/// True when the path carries a recognized GeoTIFF extension.
pub fn is_geotiff(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => GEOTIFF_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// File name with a recognized GeoTIFF extension removed; other names
/// pass through unchanged.
pub fn strip_geotiff_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if GEOTIFF_EXTENSIONS.contains(&ext.to_lowercase().as_str()) => stem,
        _ => name,
    }
}

/// Fallback listing strategy over a storage prefix.
#[async_trait]
pub trait RasterLister: Send + Sync {
    /// List GeoTIFF locations under a prefix, optionally filtered by a
    /// filename pattern. Empty results are valid; storage access errors
    /// propagate.
    async fn list_geotiffs(&self, prefix: &str, pattern: Option<&Regex>) -> EoResult<Vec<String>>;
}

/// Lister backed by a storage backend's recursive walk.
pub struct StorageLister {
    backend: Box<dyn StorageBackend>,
}

impl StorageLister {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl RasterLister for StorageLister {
    async fn list_geotiffs(&self, prefix: &str, pattern: Option<&Regex>) -> EoResult<Vec<String>> {
        let files = self.backend.walk(prefix).await?;
        Ok(files
            .into_iter()
            .filter(|path| {
                let name = path.rsplit('/').next().unwrap_or(path);
                is_geotiff(name) && pattern.map_or(true, |re| re.is_match(name))
            })
            .collect())
    }
}

/// Enumerate candidate rasters for one mapset, catalog first, storage
/// listing on any catalog error.
pub async fn discover_mapset_rasters(
    catalog: &dyn CatalogSource,
    lister: &dyn RasterLister,
    mapset_code: &str,
) -> EoResult<Vec<String>> {
    let rasters = match catalog.mapset_rasters(mapset_code).await {
        Ok(rasters) => rasters,
        Err(e) => {
            warn!(
                mapset = %mapset_code,
                error = %e,
                "Catalog API unavailable, falling back to storage listing"
            );
            let prefix = format!("{}/{}", MAPSET_GS_PREFIX, mapset_code);
            lister.list_geotiffs(&prefix, None).await?
        }
    };

    // Prefer gsutil URIs over the public URL form.
    let rasters: Vec<String> = rasters.iter().map(|uri| to_gs_form(uri)).collect();
    info!(mapset = %mapset_code, count = rasters.len(), "Found rasters for mapset");
    Ok(rasters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eo_common::EoError;

    struct StubCatalog {
        result: Result<Vec<String>, ()>,
    }

    #[async_trait]
    impl CatalogSource for StubCatalog {
        async fn mapset_rasters(&self, _mapset_code: &str) -> EoResult<Vec<String>> {
            match &self.result {
                Ok(urls) => Ok(urls.clone()),
                Err(()) => Err(EoError::Network("HTTP 503".to_string())),
            }
        }
    }

    struct StubLister {
        files: Vec<String>,
    }

    #[async_trait]
    impl RasterLister for StubLister {
        async fn list_geotiffs(
            &self,
            _prefix: &str,
            _pattern: Option<&Regex>,
        ) -> EoResult<Vec<String>> {
            Ok(self.files.clone())
        }
    }

    #[test]
    fn test_is_geotiff() {
        assert!(is_geotiff("L2-RSM-D.2023-01-D1.tif"));
        assert!(is_geotiff("upper.TIF"));
        assert!(is_geotiff("x.tiff"));
        assert!(is_geotiff("x.gtiff"));
        assert!(!is_geotiff("x.jp2"));
        assert!(!is_geotiff("no-extension"));
    }

    #[test]
    fn test_strip_geotiff_extension() {
        assert_eq!(
            strip_geotiff_extension("L2-RSM-D.2023-01-D1.tif"),
            "L2-RSM-D.2023-01-D1"
        );
        assert_eq!(strip_geotiff_extension("x.tiff"), "x");
        assert_eq!(strip_geotiff_extension("x.GTIFF"), "x");
        // Unrecognized extensions pass through untouched.
        assert_eq!(strip_geotiff_extension("x.jp2"), "x.jp2");
        assert_eq!(strip_geotiff_extension("no-extension"), "no-extension");
    }

    #[tokio::test]
    async fn test_catalog_results_normalized_to_gs_form() {
        let catalog = StubCatalog {
            result: Ok(vec![
                "https://storage.googleapis.com/fao-gismgr-wapor-3-data/DATA/WAPOR-3/MAPSET/L2-RSM-D/L2-RSM-D.2023-01-D1.tif"
                    .to_string(),
            ]),
        };
        let lister = StubLister { files: vec![] };

        let rasters = discover_mapset_rasters(&catalog, &lister, "L2-RSM-D")
            .await
            .unwrap();
        assert_eq!(
            rasters,
            vec!["gs://fao-gismgr-wapor-3-data/DATA/WAPOR-3/MAPSET/L2-RSM-D/L2-RSM-D.2023-01-D1.tif"]
        );
    }

    #[tokio::test]
    async fn test_fallback_on_catalog_error() {
        let catalog = StubCatalog { result: Err(()) };
        let lister = StubLister {
            files: vec![
                "gs://fao-gismgr-wapor-3-data/DATA/WAPOR-3/MAPSET/L2-RSM-D/L2-RSM-D.2023-01-D2.tif"
                    .to_string(),
            ],
        };

        let rasters = discover_mapset_rasters(&catalog, &lister, "L2-RSM-D")
            .await
            .unwrap();
        assert_eq!(rasters.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_empty_is_valid() {
        let catalog = StubCatalog { result: Err(()) };
        let lister = StubLister { files: vec![] };

        let rasters = discover_mapset_rasters(&catalog, &lister, "L2-RSM-D")
            .await
            .unwrap();
        assert!(rasters.is_empty());
    }

    #[tokio::test]
    async fn test_lister_filters_extensions_and_pattern() {
        let backend = eo_storage::LocalBackend::new();
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.2023-01-D1.tif", "b.2023-01-D1.xml", "a.2023-02-D2.tif"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let lister = StorageLister::new(Box::new(backend));
        let pattern = Regex::new(r"2023-01").unwrap();
        let files = lister
            .list_geotiffs(dir.path().to_str().unwrap(), Some(&pattern))
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.2023-01-D1.tif"));
    }
}
