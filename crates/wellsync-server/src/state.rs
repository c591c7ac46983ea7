//! Shared application state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;
use wellsync_core::WellSyncConfig;
use wellsync_infer::Backends;
use wellsync_search::{ChangeEvent, EmbeddingGenerator, FaultSearch};
use wellsync_store::SqliteStore;

/// Counters for events handled by the change-feed worker.
#[derive(Debug, Default)]
pub struct ChangeFeedStats {
    processed: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeFeedSnapshot {
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl ChangeFeedStats {
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ChangeFeedSnapshot {
        ChangeFeedSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: WellSyncConfig,
    pub store: Arc<SqliteStore>,
    pub backends: Backends,
    pub generator: EmbeddingGenerator,
    pub search: FaultSearch,
    pub change_tx: mpsc::UnboundedSender<ChangeEvent>,
    change_rx: Mutex<Option<mpsc::UnboundedReceiver<ChangeEvent>>>,
    pub feed_stats: ChangeFeedStats,
}

impl AppState {
    pub fn new(config: WellSyncConfig, store: SqliteStore, backends: Backends) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(store);

        let generator = EmbeddingGenerator::new(backends.embedder.clone(), store.clone());
        let search = FaultSearch::new(&backends, store.clone(), &config.search);

        Self {
            config,
            store,
            backends,
            generator,
            search,
            change_tx: tx,
            change_rx: Mutex::new(Some(rx)),
            feed_stats: ChangeFeedStats::default(),
        }
    }

    /// Take the change-feed receiver (can only be called once, by the worker).
    pub fn take_change_rx(&self) -> Option<mpsc::UnboundedReceiver<ChangeEvent>> {
        self.change_rx.lock().take()
    }

    /// Publish a change event to the worker. Dropped with a warning if the worker is gone.
    pub fn publish(&self, event: ChangeEvent) {
        if let Err(e) = self.change_tx.send(event) {
            warn!("Change feed closed, event dropped: {}", e);
        }
    }
}
