//! WaPOR v3 catalog API client.
//!
//! WaPOR variables are grouped into mapsets, each containing one raster
//! per dekad. The catalog returns pages of raster records with a
//! `links[rel=next]` relation; pagination follows that link until it is
//! absent. Any non-success status aborts the whole listing — pages are
//! never silently dropped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use eo_common::{EoError, EoResult};

pub const DEFAULT_BASE_URL: &str =
    "https://data.apps.fao.org/gismgr/api/v2/catalog/workspaces/WAPOR-3/mapsets";

/// Source of raster download locations for one mapset.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn mapset_rasters(&self, mapset_code: &str) -> EoResult<Vec<String>>;
}

pub struct CatalogClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    response: CatalogPage,
}

#[derive(Debug, Deserialize)]
struct CatalogPage {
    #[serde(default)]
    items: Vec<RasterRecord>,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct RasterRecord {
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    rel: String,
    href: String,
}

impl CatalogClient {
    pub fn new() -> EoResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> EoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EoError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn mapset_rasters(&self, mapset_code: &str) -> EoResult<Vec<String>> {
        let mut next = Some(format!("{}/{}/rasters", self.base_url, mapset_code));
        let mut urls = Vec::new();
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| EoError::Network(format!("Catalog request failed: {}", e)))?
                .error_for_status()
                .map_err(|e| EoError::Network(format!("Catalog request failed: {}", e)))?;

            let envelope: CatalogEnvelope = response
                .json()
                .await
                .map_err(|e| EoError::Network(format!("Catalog page invalid: {}", e)))?;

            let page = envelope.response;
            urls.extend(page.items.into_iter().filter_map(|r| r.download_url));
            next = page
                .links
                .into_iter()
                .find(|l| l.rel == "next")
                .map(|l| l.href);
            pages += 1;
        }

        debug!(mapset = %mapset_code, pages, rasters = urls.len(), "Catalog listing complete");
        Ok(urls)
    }
}
