use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;

/// Atomically-updated import counters, read by the reporter task
/// independently of the scanning path.
#[derive(Debug)]
pub struct ImportCounters {
    pub nodes: AtomicU64,
    pub skipped_nodes: AtomicU64,
    pub ways: AtomicU64,
    pub edges: AtomicU64,
    pub dropped_edges: AtomicU64,
    started: Instant,
}

impl ImportCounters {
    pub fn new() -> Self {
        ImportCounters {
            nodes: AtomicU64::new(0),
            skipped_nodes: AtomicU64::new(0),
            ways: AtomicU64::new(0),
            edges: AtomicU64::new(0),
            dropped_edges: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for ImportCounters {
    fn default() -> Self {
        ImportCounters::new()
    }
}

/// Periodic progress logger. Only reads the counters; performs no
/// graph or store mutation.
pub struct ProgressReporter {
    handle: tokio::task::JoinHandle<()>,
}

impl ProgressReporter {
    pub const PERIOD: Duration = Duration::from_secs(5);

    pub fn spawn(counters: Arc<ImportCounters>) -> ProgressReporter {
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + Self::PERIOD;
            let mut tick = tokio::time::interval_at(start, Self::PERIOD);

            loop {
                tick.tick().await;

                let nodes = counters.nodes.load(Ordering::Relaxed);
                let skipped = counters.skipped_nodes.load(Ordering::Relaxed);
                let ways = counters.ways.load(Ordering::Relaxed);
                let elapsed = counters.elapsed().as_secs_f64().max(1e-3);

                info!(
                    "import progress: {nodes} nodes ({:.0}/sec), {ways} ways, {skipped} skipped",
                    nodes as f64 / elapsed
                );
            }
        });

        ProgressReporter { handle }
    }

    pub fn finish(self) {
        self.handle.abort();
    }
}
