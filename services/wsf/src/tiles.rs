//! Per-tile processing pipeline.
//!
//! Each tile is handled independently: gate on what already exists in
//! the destination bucket, admit the tile's declared footprint against
//! the Africa extent, then download, upload and describe it. A tile
//! that fails never aborts the batch; it is counted and the loop moves
//! on to the next one.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use geo_types::Polygon;
use tracing::{error, info, warn};

use eo_common::extent::polygon_from_geometry;
use eo_common::{decide, EoError, EoResult, PublishDecision, RegionOfInterest, TileId, WsfEdition};
use eo_storage::{StorageBackend, WriteOptions};

use crate::download::Downloader;
use crate::stac;

/// What happened to one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileOutcome {
    /// Data uploaded and descriptor written.
    Published,
    /// Data was already in place; only the descriptor was rewritten.
    MetadataRefreshed,
    /// Descriptor already exists and no refresh was requested.
    Skipped,
    /// Footprint missing or outside the region of interest.
    Filtered,
    Failed,
}

impl fmt::Display for TileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileOutcome::Published => write!(f, "published"),
            TileOutcome::MetadataRefreshed => write!(f, "metadata-refreshed"),
            TileOutcome::Skipped => write!(f, "skipped"),
            TileOutcome::Filtered => write!(f, "filtered"),
            TileOutcome::Failed => write!(f, "failed"),
        }
    }
}

pub struct TileProcessor {
    edition: WsfEdition,
    base_dir: PathBuf,
    /// Batch destination, `s3://bucket/prefix`; each tile gets its own
    /// subfolder under it.
    destination: String,
    update_metadata: bool,
    region: RegionOfInterest,
    downloader: Downloader,
    storage: Box<dyn StorageBackend>,
}

impl TileProcessor {
    pub fn new(
        edition: WsfEdition,
        base_dir: PathBuf,
        destination: String,
        update_metadata: bool,
        region: RegionOfInterest,
        downloader: Downloader,
        storage: Box<dyn StorageBackend>,
    ) -> Self {
        Self {
            edition,
            base_dir,
            destination,
            update_metadata,
            region,
            downloader,
            storage,
        }
    }

    pub async fn process(&self, tile: &TileId) -> TileOutcome {
        match self.try_process(tile).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(tile = %tile, error = %e, "Tile failed");
                TileOutcome::Failed
            }
        }
    }

    async fn try_process(&self, tile: &TileId) -> EoResult<TileOutcome> {
        let folder_name = self.edition.folder_name(tile);
        let destination = format!("{}/{}", self.destination, tile);
        let stac_href = format!("{}/{}.stac-item.json", destination, folder_name);
        let tif_href = format!("{}/{}.tif", destination, folder_name);

        let descriptor_exists = self.storage.exists(&stac_href).await?;
        let data_exists = if self.update_metadata {
            self.storage.is_file(&tif_href).await?
        } else {
            false
        };

        match decide(descriptor_exists, data_exists, self.update_metadata) {
            PublishDecision::Skip => {
                info!(stac = %stac_href, "Descriptor already exists, skipping");
                return Ok(TileOutcome::Skipped);
            }
            PublishDecision::NeedsMetadataOnly => {
                info!(data = %tif_href, "Data exists, refreshing metadata only");
                let footprint = self.fetch_footprint(&folder_name).await?;
                self.write_descriptor(tile, &footprint, &destination, &stac_href)
                    .await?;
                return Ok(TileOutcome::MetadataRefreshed);
            }
            PublishDecision::NeedsFullProcessing => {}
        }

        // The provider publishes a descriptor only for tiles it has
        // data for; a missing or malformed one means there is nothing
        // to fetch here.
        let footprint = match self.fetch_footprint(&folder_name).await {
            Ok(footprint) => footprint,
            Err(e) => {
                info!(tile = %tile, reason = %e, "No usable footprint, filtering out");
                return Ok(TileOutcome::Filtered);
            }
        };
        if !self.region.admits(&footprint) {
            info!(tile = %tile, "Footprint outside region of interest");
            return Ok(TileOutcome::Filtered);
        }

        let tile_dir = self.base_dir.join(tile.to_string());
        let workdir = tile_dir.join("wrk");
        tokio::fs::create_dir_all(&workdir).await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to create {}: {}", workdir.display(), e))
        })?;

        let tif_name = format!("{}.tif", folder_name);
        let tif_path = workdir.join(&tif_name);
        if tif_path.exists() {
            info!(path = %tif_path.display(), "Skipping download, file already exists");
        } else {
            let url =
                self.downloader
                    .tile_file_url(self.edition.source_folder(), &folder_name, &tif_name);
            self.downloader.download_to_file(&url, &tif_path).await?;
        }

        let data = tokio::fs::read(&tif_path).await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to read {}: {}", tif_path.display(), e))
        })?;
        info!(destination = %tif_href, bytes = data.len(), "Uploading raster");
        self.storage
            .write(&tif_href, Bytes::from(data), &WriteOptions::geotiff())
            .await?;

        self.write_descriptor(tile, &footprint, &destination, &stac_href)
            .await?;

        if let Err(e) = tokio::fs::remove_dir_all(&tile_dir).await {
            warn!(path = %tile_dir.display(), error = %e, "Failed to clean up workdir");
        }

        Ok(TileOutcome::Published)
    }

    /// Fetch the provider's descriptor for this tile and parse its
    /// footprint polygon.
    async fn fetch_footprint(&self, folder_name: &str) -> EoResult<Polygon<f64>> {
        let url = self.downloader.tile_file_url(
            self.edition.source_folder(),
            folder_name,
            &format!("{}_stac.json", folder_name),
        );
        let doc = self.downloader.fetch_json(&url).await?;
        let geometry = doc
            .get("geometry")
            .ok_or_else(|| EoError::Validation(format!("{} has no geometry", url)))?;
        polygon_from_geometry(geometry)
    }

    async fn write_descriptor(
        &self,
        tile: &TileId,
        footprint: &Polygon<f64>,
        destination: &str,
        stac_href: &str,
    ) -> EoResult<()> {
        let item = stac::build_item(self.edition, tile, footprint, destination);
        let body = item
            .to_pretty_json()
            .map_err(|e| EoError::Internal(format!("Failed to serialize STAC item: {}", e)))?;
        self.storage
            .write(stac_href, Bytes::from(body), &WriteOptions::json())
            .await?;
        info!(stac = %stac_href, "STAC item written");
        Ok(())
    }
}
