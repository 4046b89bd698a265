//! World Settlement Footprint tile downloader.
//!
//! Walks the full 2x2 degree tile grid over Africa for one WSF edition,
//! admits each tile's footprint against the continental extent, mirrors
//! the admitted rasters into S3 and writes one STAC item per tile.

mod download;
mod stac;
mod tiles;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use eo_common::tile::tile_grid;
use eo_common::{RegionOfInterest, WsfEdition};

use download::Downloader;
use tiles::{TileOutcome, TileProcessor};

const AFRICA_EXTENT_URL: &str =
    "https://raw.githubusercontent.com/digitalearthafrica/deafrica-extent/master/africa-extent.json";

#[derive(Parser, Debug)]
#[command(name = "download-wsf")]
#[command(about = "Mirror World Settlement Footprint tiles and their STAC items into S3")]
struct Args {
    /// Edition of the WSF, like '2015' or 'evolution'
    #[arg(long, short)]
    edition: WsfEdition,

    /// The directory to download files to
    #[arg(long, short, default_value = "/tmp/download")]
    workdir: PathBuf,

    /// The S3 bucket to upload to
    #[arg(long, short)]
    s3_bucket: String,

    /// The S3 path to upload to
    #[arg(long, short = 'p')]
    s3_path: String,

    /// Update only metadata if the data already exists
    #[arg(long, short)]
    update_metadata: bool,

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

    let destination = format!(
        "s3://{}/{}",
        args.s3_bucket
            .trim_start_matches("s3://")
            .trim_end_matches('/'),
        args.s3_path.trim_matches('/')
    );
    info!(edition = %args.edition, destination = %destination, "Starting WSF batch");

    let downloader = Downloader::new()?;
    let extent = downloader
        .fetch_json(AFRICA_EXTENT_URL)
        .await
        .context("Failed to fetch the Africa extent")?;
    let region = RegionOfInterest::from_feature_collection(&extent)?;

    let storage = eo_storage::for_uri(&destination).await?;
    let processor = TileProcessor::new(
        args.edition,
        args.workdir,
        destination,
        args.update_metadata,
        region,
        downloader,
        storage,
    );

    // Cooperative cancellation between tiles; an in-flight tile is
    // allowed to finish.
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            warn!("Received shutdown signal, finishing current tile");
            cancelled.store(true, Ordering::SeqCst);
        });
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut cancelled_early = false;
    for tile in tile_grid() {
        if cancelled.load(Ordering::SeqCst) {
            cancelled_early = true;
            break;
        }
        let outcome = processor.process(&tile).await;
        *counts.entry(outcome.to_string()).or_insert(0) += 1;
    }

    for (outcome, count) in &counts {
        info!(outcome = %outcome, count, "Batch outcome");
    }
    if cancelled_early {
        warn!("Batch cancelled before completing the grid");
    }

    let failed = counts
        .get(&TileOutcome::Failed.to_string())
        .copied()
        .unwrap_or(0);
    if failed > 0 {
        bail!("{} tiles failed", failed);
    }
    Ok(())
}
