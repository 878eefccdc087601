//! Parallel row scheduler.
//!
//! The image is cut into contiguous blocks of rows. Every block but the last
//! runs on its own scoped thread; the caller renders the last one itself and
//! then joins the rest. Each worker owns a disjoint slice of the output
//! buffer, so nothing is locked.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::Instant;

use crate::hittable::Hittable;
use crate::renderer::{render_rows, ImageBuffer, RenderConfig};
use crate::Camera;

/// Fewest rows worth handing to a separate thread.
pub const MIN_ROWS_PER_WORKER: u32 = 25;

/// Worker count assumed when the platform cannot report its parallelism.
const FALLBACK_THREADS: usize = 2;

/// Deepest recursion a render will run. `ray_color` recurses once per
/// bounce, and worker threads get the default spawned-thread stack.
pub const MAX_DEPTH_LIMIT: u32 = 1024;

/// Number of hardware threads available to this process.
pub fn hardware_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(FALLBACK_THREADS)
}

/// Split `[0, height)` into at most `max_workers` contiguous blocks of at
/// least `min_rows` rows each. The last block takes the remainder.
///
/// A short image still gets one block covering all of it.
pub fn plan_row_blocks(height: u32, min_rows: u32, max_workers: usize) -> Vec<Range<u32>> {
    if height == 0 {
        return Vec::new();
    }

    let by_rows = (height / min_rows.max(1)).max(1);
    let workers = by_rows.min(u32::try_from(max_workers.max(1)).unwrap_or(u32::MAX));
    let rows_per_worker = height / workers;

    (0..workers)
        .map(|w| {
            let start = w * rows_per_worker;
            let end = if w + 1 == workers {
                height
            } else {
                start + rows_per_worker
            };
            start..end
        })
        .collect()
}

/// Resolve the configured thread cap against the hardware.
fn worker_limit(config: &RenderConfig) -> usize {
    let hardware = hardware_threads();
    match config.threads {
        Some(0) => {
            log::warn!("threads = 0 requested, rendering on 1 thread");
            1
        }
        Some(n) if n > hardware => {
            log::warn!(
                "threads = {} exceeds hardware parallelism, clamping to {}",
                n,
                hardware
            );
            hardware
        }
        Some(n) => n,
        None => hardware,
    }
}

/// Cap `max_depth` at [`MAX_DEPTH_LIMIT`].
fn depth_limited(config: &RenderConfig) -> RenderConfig {
    let mut config = config.clone();
    if config.max_depth > MAX_DEPTH_LIMIT {
        log::warn!(
            "max_depth = {} exceeds the recursion limit, clamping to {}",
            config.max_depth,
            MAX_DEPTH_LIMIT
        );
        config.max_depth = MAX_DEPTH_LIMIT;
    }
    config
}

/// Render the full image across worker threads and wait for all of them.
///
/// For a fixed `config.seed` the result does not depend on the number of
/// workers.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> ImageBuffer {
    let config = depth_limited(config);
    render_with_workers(camera, world, &config, worker_limit(&config))
}

/// Render on up to `max_workers` threads, without checking the count
/// against the hardware.
fn render_with_workers(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    max_workers: usize,
) -> ImageBuffer {
    let (width, height) = (camera.image_width, camera.image_height);
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let blocks = plan_row_blocks(height, config.min_rows_per_worker, max_workers);

    log::info!(
        "Rendering {}x{} at {} spp, max depth {}, {} worker(s), seed {}",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        blocks.len(),
        base_seed
    );
    log::debug!("Row blocks: {:?}", blocks);

    let start = Instant::now();
    let mut image = ImageBuffer::new(width, height);
    let row_bytes = width as usize * 3;

    let mut jobs: Vec<(Range<u32>, &mut [u8])> = Vec::with_capacity(blocks.len());
    let mut rest: &mut [u8] = &mut image.pixels;
    for rows in blocks {
        let len = (rows.end - rows.start) as usize * row_bytes;
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
        jobs.push((rows, head));
        rest = tail;
    }

    if let Some((last_rows, last_out)) = jobs.pop() {
        let result = crossbeam::thread::scope(|scope| {
            for (rows, out) in jobs {
                scope.spawn(move |_| render_rows(camera, world, config, rows, out, base_seed));
            }
            // The calling thread takes the last block
            render_rows(camera, world, config, last_rows, last_out, base_seed);
        });

        if let Err(panic) = result {
            std::panic::resume_unwind(panic);
        }
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
