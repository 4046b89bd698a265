//! STAC item assembly for WaPOR rasters.
//!
//! Raster filenames follow `<MAPSET-CODE>.<YYYY-MM-Dk>.tif`; the final
//! dot-separated component carries the dekad the composite covers. The
//! item id is derived deterministically from (product name, dataset
//! version, tile id) so re-runs regenerate identical descriptors.

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use tracing::debug;

use eo_common::uri::to_public_form;
use eo_common::{dataset_uuid, Dekad, EoError, EoResult};
use stac_model::{media_type, StacAsset, StacItem};

use crate::discovery::strip_geotiff_extension;
use crate::product::ProductDefinition;

/// Version token of the source dataset, part of every item id.
pub const DATASET_VERSION: &str = "v3.0";

const PLATFORM: &str = "WaPORv3";
const PRODUCER: &str = "www.fao.org";

/// Tile id of a raster: the file name without its extension, e.g.
/// `L2-RSM-D.2023-01-D1`. Any extension discovery admits is stripped.
pub fn tile_id_from_path(raster_uri: &str) -> EoResult<String> {
    let name = raster_uri.rsplit('/').next().unwrap_or(raster_uri);
    let tile_id = strip_geotiff_extension(name);
    if tile_id.is_empty() {
        return Err(EoError::Validation(format!(
            "Cannot derive tile id from {}",
            raster_uri
        )));
    }
    Ok(tile_id.to_string())
}

/// Dekad encoded in a tile id's final dot-separated component.
pub fn dekad_from_tile_id(tile_id: &str) -> EoResult<Dekad> {
    let suffix = tile_id.rsplit('.').next().unwrap_or(tile_id);
    Dekad::from_compact_str(suffix)
        .map_err(|e| EoError::Validation(format!("Tile id {}: {}", tile_id, e)))
}

/// Last-Modified of the raster, when the server reports one. GCS
/// locations are probed through their public URL form.
pub async fn last_modified(client: &Client, raster_uri: &str) -> Option<DateTime<FixedOffset>> {
    let url = to_public_form(raster_uri);
    let response = client.head(&url).send().await.ok()?;
    let header = response.headers().get(reqwest::header::LAST_MODIFIED)?;
    let parsed = DateTime::parse_from_rfc2822(header.to_str().ok()?).ok();
    if parsed.is_none() {
        debug!(url = %url, "Unparseable Last-Modified header");
    }
    parsed
}

/// Assemble the STAC item for one raster.
pub fn build_item(
    product: &ProductDefinition,
    raster_uri: &str,
    tile_id: &str,
    dekad: &Dekad,
    processed: Option<DateTime<FixedOffset>>,
    self_href: &str,
) -> StacItem {
    let resolution = dekad.resolve();

    let id = dataset_uuid(&product.name, DATASET_VERSION, &[tile_id], &[]);
    let mut item = StacItem::new(id);

    item.set_datetime(resolution.datetime);
    item.set_datetime_range(resolution.start, resolution.end);
    item.set_property("odc:product", product.name.as_str());
    item.set_property("odc:file_format", "GeoTIFF");
    item.set_property("odc:dataset_version", DATASET_VERSION);
    item.set_property("odc:region_code", tile_id);
    item.set_property("platform", PLATFORM);
    item.set_property("producer", PRODUCER);
    if let Some(processed) = processed {
        item.set_property("created", processed.to_rfc3339());
    }

    // Band hrefs use the public URL form so the items are browsable
    // without gsutil.
    let href = to_public_form(raster_uri);
    for measurement in &product.measurements {
        item.add_asset(&measurement.name, StacAsset::data(href.clone(), media_type::COG));
    }

    item.set_self_href(self_href);
    item
}
