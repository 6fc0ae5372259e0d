//! Background tile preloading.
//!
//! A single tokio task receives preload requests over a bounded channel and
//! renders the eight neighbors of the requested tile on the blocking pool,
//! storing results in the [`TileCache`]. A request may also ask for the tile
//! itself, which is then loaded first. It never touches the display. If the
//! zoom changes while a request is in flight, its results are discarded by
//! the cache's generation check.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::coord::TileAddress;
use crate::source::TileSource;

use super::TileCache;

/// Default depth of the request queue.
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

/// Offsets of the eight neighbors, row by row.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A request to warm the neighbors of a tile.
#[derive(Debug, Clone)]
pub struct PreloadRequest {
    pub center: TileAddress,
    /// Load `center` itself before its neighbors.
    pub include_center: bool,
    /// Cache generation at request time.
    pub generation: u64,
}

/// Counters shared with the worker.
#[derive(Debug, Default)]
pub struct PreloadStats {
    pub requests: AtomicU64,
    pub dropped: AtomicU64,
    pub loaded: AtomicU64,
    pub failed: AtomicU64,
}

/// Handle to the preload worker.
pub struct Preloader {
    sender: mpsc::Sender<PreloadRequest>,
    handle: JoinHandle<()>,
    cache: Arc<TileCache>,
    stats: Arc<PreloadStats>,
}

impl Preloader {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(source: Arc<TileSource>, cache: Arc<TileCache>, queue_depth: usize) -> Self {
        Self::spawn_on(&tokio::runtime::Handle::current(), source, cache, queue_depth)
    }

    /// Spawns the worker on an explicit runtime handle.
    pub fn spawn_on(
        runtime: &tokio::runtime::Handle,
        source: Arc<TileSource>,
        cache: Arc<TileCache>,
        queue_depth: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let stats = Arc::new(PreloadStats::default());
        let handle = runtime.spawn(run_worker(
            receiver,
            source,
            Arc::clone(&cache),
            Arc::clone(&stats),
        ));
        Self {
            sender,
            handle,
            cache,
            stats,
        }
    }

    /// Queues the neighbors of `center` for preloading.
    ///
    /// Never blocks. Returns `false` when the queue is full or the worker is
    /// gone; the request is then simply dropped.
    pub fn request_neighbors(&self, center: &TileAddress) -> bool {
        self.send(center, false)
    }

    /// Queues `center` and then its neighbors, for a canvas whose center tile
    /// is not cached yet.
    pub fn request_tile_and_neighbors(&self, center: &TileAddress) -> bool {
        self.send(center, true)
    }

    fn send(&self, center: &TileAddress, include_center: bool) -> bool {
        self.stats.requests.fetch_add(1, Ordering::Relaxed);
        let request = PreloadRequest {
            center: center.clone(),
            include_center,
            generation: self.cache.generation(),
        };
        match self.sender.try_send(request) {
            Ok(()) => true,
            Err(err) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(tile = %center, error = %err, "preload request dropped");
                false
            }
        }
    }

    pub fn stats(&self) -> Arc<PreloadStats> {
        Arc::clone(&self.stats)
    }

    /// Closes the queue and waits for queued work to finish.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(err) = self.handle.await {
            warn!(error = %err, "preload worker ended abnormally");
        }
    }
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<PreloadRequest>,
    source: Arc<TileSource>,
    cache: Arc<TileCache>,
    stats: Arc<PreloadStats>,
) {
    while let Some(request) = receiver.recv().await {
        let own = request.include_center.then_some((0, 0));
        for (dx, dy) in own.into_iter().chain(NEIGHBOR_OFFSETS) {
            if cache.generation() != request.generation {
                trace!(tile = %request.center, "preload superseded by zoom change");
                break;
            }
            let Ok(neighbor) = request.center.neighbor(dx, dy) else {
                continue;
            };
            if cache.contains(&neighbor.path) {
                continue;
            }

            let path = neighbor.path.clone();
            let worker_source = Arc::clone(&source);
            let result =
                tokio::task::spawn_blocking(move || worker_source.render(&path)).await;
            match result {
                Ok(Ok(raster)) => {
                    if cache.put_if_current(request.generation, &neighbor.path, Arc::new(raster)) {
                        stats.loaded.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Ok(Err(err)) if err.is_absent() => {
                    trace!(path = %neighbor.path, "preload: tile absent");
                }
                Ok(Err(err)) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    debug!(path = %neighbor.path, error = %err, "preload failed");
                }
                Err(err) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(path = %neighbor.path, error = %err, "preload task panicked");
                }
            }
        }
    }
    debug!("preload worker stopped");
}
