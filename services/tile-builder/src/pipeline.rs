//! Per-region pipeline: enumerate, fetch, overlay, persist, summarize.
//!
//! Workers fetch and composite tiles concurrently; completed tiles are
//! handed over a channel to a single writer task that owns the archive
//! and commits in batches. Per-tile failures are recorded and never
//! abort the job; an archive failure does.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use image::RgbaImage;
use tokio::sync::mpsc;
use tracing::{info, warn};

use geodesy::mercator::tiles_for_bounds;
use mbtiles::{Archive, ArchiveMetadata};
use overlay::{compute_overlay, render_overlay};
use tiler_common::{TileCoord, TilerError, TilerResult, TILE_SIZE};

use crate::config::RegionConfig;
use crate::fetch::TileFetcher;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;
/// Tiles accumulated before the writer commits a transaction.
const WRITE_BATCH_SIZE: usize = 64;
/// Per-request timeout for tile fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Progress is logged every this many processed tiles.
const PROGRESS_INTERVAL: usize = 100;

/// Final counts for one region run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    /// Tiles enumerated from the bounding box across the zoom range.
    pub requested: usize,
    /// Tiles persisted to the archive (overlay-skipped ones included).
    pub written: usize,
    /// Tiles persisted without an overlay (MGRS domain edge cases).
    pub overlay_skipped: usize,
    /// Tiles that failed permanently after retries.
    pub failed: usize,
}

enum TileOutcome {
    Written { overlay_skipped: bool },
    Failed,
}

/// Build one region's archive end to end.
pub async fn run_region(region: &RegionConfig, workers: usize) -> TilerResult<RegionSummary> {
    region.validate()?;
    let workers = workers.max(1);

    let bounds = region.bounds();
    let zoom_range = region.zoom_range();

    let mut tiles: Vec<TileCoord> = Vec::new();
    for zoom in zoom_range.iter() {
        tiles.extend(tiles_for_bounds(&bounds, zoom));
    }
    let requested = tiles.len();

    info!(
        region = %region.name,
        url = %region.map_url,
        output = %region.output_file.display(),
        zoom_min = zoom_range.min,
        zoom_max = zoom_range.max,
        tiles = requested,
        "Starting region build"
    );

    let archive = Archive::open(&region.output_file).await?;
    archive
        .write_metadata(&ArchiveMetadata {
            name: region.name.clone(),
            description: format!("{} with MGRS grid overlay and zone labels", region.name),
            bounds,
            zoom_range,
            format: "png".to_string(),
        })
        .await?;

    // Single writer task: the only component touching the archive while
    // tiles are in flight
    let (tile_tx, mut tile_rx) = mpsc::channel::<(TileCoord, Vec<u8>)>(workers * 2);
    let writer = tokio::spawn(async move {
        let mut pending: Vec<(TileCoord, Vec<u8>)> = Vec::with_capacity(WRITE_BATCH_SIZE);
        while let Some(tile) = tile_rx.recv().await {
            pending.push(tile);
            if pending.len() >= WRITE_BATCH_SIZE {
                archive.put_tiles(&pending).await?;
                pending.clear();
            }
        }
        archive.put_tiles(&pending).await?;
        archive.close().await;
        Ok::<(), TilerError>(())
    });

    let fetcher = Arc::new(TileFetcher::new(&region.map_url, FETCH_TIMEOUT)?);
    let started = Instant::now();
    let processed = Arc::new(AtomicUsize::new(0));

    let outcomes: Vec<TileOutcome> = stream::iter(tiles)
        .map(|coord| {
            let fetcher = fetcher.clone();
            let tile_tx = tile_tx.clone();
            let processed = processed.clone();
            async move {
                let outcome = process_tile(&fetcher, coord, &tile_tx).await;

                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 {
                    let elapsed = started.elapsed().as_secs_f64();
                    let rate = done as f64 / elapsed.max(f64::EPSILON);
                    let eta_secs = (requested - done) as f64 / rate.max(f64::EPSILON);
                    info!(
                        done = done,
                        total = requested,
                        rate = format!("{:.1} tiles/s", rate),
                        eta = format!("{:.1} min", eta_secs / 60.0),
                        "Progress"
                    );
                }

                outcome
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    // Close the channel so the writer flushes its final batch
    drop(tile_tx);
    writer
        .await
        .map_err(|e| TilerError::Archive(format!("writer task panicked: {}", e)))??;

    let mut summary = RegionSummary {
        requested,
        written: 0,
        overlay_skipped: 0,
        failed: 0,
    };
    for outcome in outcomes {
        match outcome {
            TileOutcome::Written { overlay_skipped } => {
                summary.written += 1;
                if overlay_skipped {
                    summary.overlay_skipped += 1;
                }
            }
            TileOutcome::Failed => summary.failed += 1,
        }
    }

    info!(
        region = %region.name,
        requested = summary.requested,
        written = summary.written,
        overlay_skipped = summary.overlay_skipped,
        failed = summary.failed,
        elapsed_secs = started.elapsed().as_secs(),
        "Region build complete"
    );

    Ok(summary)
}

/// Fetch, composite, and hand one tile to the writer.
async fn process_tile(
    fetcher: &TileFetcher,
    coord: TileCoord,
    tile_tx: &mpsc::Sender<(TileCoord, Vec<u8>)>,
) -> TileOutcome {
    // A closed channel means the writer died on an archive error; drain
    // the remaining coordinates without fetching them
    if tile_tx.is_closed() {
        return TileOutcome::Failed;
    }

    let mut image = match fetcher.fetch(&coord).await {
        Ok(image) => image,
        Err(err) => {
            warn!(tile = %coord, error = %err, "Tile fetch failed");
            return TileOutcome::Failed;
        }
    };

    // Projection failures keep the base imagery and drop only the overlay
    let overlay_skipped = match compute_overlay(&coord, TILE_SIZE) {
        Ok(spec) => {
            render_overlay(&mut image, &spec);
            false
        }
        Err(err) => {
            warn!(tile = %coord, error = %err, "Skipping MGRS overlay");
            true
        }
    };

    let bytes = match encode_png(&image) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(tile = %coord, error = %err, "Tile encode failed");
            return TileOutcome::Failed;
        }
    };

    // A closed channel means the writer hit an archive error; the join
    // below surfaces it as the job failure
    if tile_tx.send((coord, bytes)).await.is_err() {
        return TileOutcome::Failed;
    }

    TileOutcome::Written { overlay_skipped }
}

fn encode_png(image: &RgbaImage) -> TilerResult<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), image::ImageOutputFormat::Png)
        .map_err(|e| TilerError::Image(e.to_string()))?;
    Ok(buffer)
}
