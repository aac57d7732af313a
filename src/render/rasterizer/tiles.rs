//! Parallel dispatch of a fill over disjoint tiles.
//!
//! Tiles are dealt round-robin into one bucket per worker and each bucket is
//! drained on a `rayon` scope thread. The call returns once every bucket is
//! done, so callers never observe a partial fill.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::render::framebuffer::{FrameBuffer, PixelRect, Tile};

fn run_buckets<F>(tiles: Vec<Tile<'_>>, workers: usize, fill: F) -> usize
where
    F: Fn(&mut Tile<'_>) -> usize + Sync,
{
    let workers = workers.max(1);
    let mut buckets: Vec<Vec<Tile<'_>>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, tile) in tiles.into_iter().enumerate() {
        buckets[i % workers].push(tile);
    }

    let emitted = AtomicUsize::new(0);
    rayon::scope(|s| {
        for bucket in buckets.into_iter().filter(|b| !b.is_empty()) {
            let fill = &fill;
            let emitted = &emitted;
            s.spawn(move |_| {
                let count: usize = bucket.into_iter().map(|mut tile| fill(&mut tile)).sum();
                emitted.fetch_add(count, Ordering::Relaxed);
            });
        }
    });
    emitted.into_inner()
}

/// Runs `fill` over `tile_size` squares of `region`.
pub fn for_each_tile<F>(
    fb: &mut FrameBuffer<'_>,
    region: PixelRect,
    tile_size: usize,
    workers: usize,
    fill: F,
) -> usize
where
    F: Fn(&mut Tile<'_>) -> usize + Sync,
{
    let tiles = fb.tiles(region, tile_size);
    log::trace!("dispatching {} tiles to {} workers", tiles.len(), workers);
    run_buckets(tiles, workers, fill)
}

/// Runs `fill` over one horizontal band of `region` per worker.
pub fn for_each_band<F>(fb: &mut FrameBuffer<'_>, region: PixelRect, workers: usize, fill: F) -> usize
where
    F: Fn(&mut Tile<'_>) -> usize + Sync,
{
    let bands = fb.row_bands(region, workers);
    run_buckets(bands, workers, fill)
}
