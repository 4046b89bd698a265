//! WaPOR v3 STAC item generator.
//!
//! Discovers dekadal rasters for a product's mapset (catalog API with a
//! storage-listing fallback), derives the dekad time range and a
//! deterministic dataset id from each raster name, and publishes one
//! pretty-printed STAC item per raster to local disk or S3.

mod catalog;
mod discovery;
mod product;
mod stac;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use eo_common::publish::{decide, PublishDecision};
use eo_storage::WriteOptions;

use catalog::CatalogClient;
use discovery::{discover_mapset_rasters, StorageLister, MAPSET_GS_PREFIX};
use product::{load_product_definition, mapset_code_for};

#[derive(Parser, Debug)]
#[command(name = "download-wapor-v3")]
#[command(about = "Generate STAC item files for WaPOR v3 products")]
struct Args {
    /// Name of the product to generate the STAC item files for
    #[arg(long)]
    product_name: String,

    /// File path or URL to the product definition yaml file
    #[arg(long)]
    product_yaml: String,

    /// Directory to write the STAC item files to (local or s3://)
    #[arg(long, default_value = "s3://deafrica-data-dev-af/wapor-v3/")]
    stac_output_dir: String,

    /// Regenerate items whose descriptors already exist
    #[arg(long)]
    overwrite: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mapset_code = mapset_code_for(&args.product_name)?;
    info!(product = %args.product_name, mapset = %mapset_code, "Generating STAC items");

    let product = load_product_definition(&args.product_yaml)
        .await
        .context("Failed to load product definition")?;

    // Keep items under a per-product directory.
    let mut output_dir = args.stac_output_dir.trim_end_matches('/').to_string();
    if !output_dir.ends_with(&args.product_name) {
        output_dir = format!("{}/{}", output_dir, args.product_name);
    }

    let catalog = CatalogClient::new()?;
    let lister = StorageLister::new(eo_storage::for_uri(MAPSET_GS_PREFIX).await?);
    let rasters = discover_mapset_rasters(&catalog, &lister, mapset_code).await?;

    let output = eo_storage::for_uri(&output_dir).await?;
    let probe_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("Failed to create HTTP client")?;

    // Cooperative cancellation between units; an in-flight unit is
    // allowed to finish.
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            warn!("Received shutdown signal, finishing current item");
            cancelled.store(true, Ordering::SeqCst);
        });
    }

    let total = rasters.len();
    let mut written = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for (idx, raster) in rasters.iter().enumerate() {
        if cancelled.load(Ordering::SeqCst) {
            warn!(remaining = total - idx, "Batch cancelled");
            break;
        }

        info!(raster = %raster, position = idx + 1, total, "Processing raster");

        let tile_id = match stac::tile_id_from_path(raster) {
            Ok(tile_id) => tile_id,
            Err(e) => {
                error!(raster = %raster, error = %e, "Skipping malformed raster name");
                failed += 1;
                continue;
            }
        };

        let destination = format!("{}/{}.stac-item.json", output_dir, tile_id);

        let descriptor_exists = match output.exists(&destination).await {
            Ok(exists) => exists,
            Err(e) => {
                error!(destination = %destination, error = %e, "Existence check failed");
                failed += 1;
                continue;
            }
        };

        // The raster itself already lives in the provider's bucket, so
        // the gate only ever skips or regenerates the descriptor here.
        match decide(descriptor_exists, true, args.overwrite) {
            PublishDecision::Skip => {
                info!(destination = %destination, "Descriptor already exists, skipping");
                skipped += 1;
                continue;
            }
            PublishDecision::NeedsMetadataOnly | PublishDecision::NeedsFullProcessing => {}
        }

        let dekad = match stac::dekad_from_tile_id(&tile_id) {
            Ok(dekad) => dekad,
            Err(e) => {
                error!(tile_id = %tile_id, error = %e, "Skipping raster with malformed dekad");
                failed += 1;
                continue;
            }
        };

        let processed = stac::last_modified(&probe_client, raster).await;
        let item = stac::build_item(&product, raster, &tile_id, &dekad, processed, &destination);

        let result = async {
            let body = item.to_pretty_json()?;
            output
                .write(&destination, Bytes::from(body), &WriteOptions::json())
                .await?;
            anyhow::Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!(destination = %destination, "STAC item written");
                written += 1;
            }
            Err(e) => {
                error!(destination = %destination, error = %e, "Failed to write STAC item");
                failed += 1;
            }
        }
    }

    info!(total, written, skipped, failed, "Batch complete");

    if failed > 0 {
        bail!("{} of {} rasters failed", failed, total);
    }
    Ok(())
}
