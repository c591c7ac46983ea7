//! Change-feed worker: runs the embedding generator for every published event.
//! Also backfills faults that were stored while no worker was running.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use wellsync_core::Result;
use wellsync_search::{ChangeEvent, GeneratorOutcome};

use crate::state::AppState;

/// Faults fetched per backfill round.
const BACKFILL_BATCH: usize = 100;

/// Start the background change-feed worker task.
pub fn start_change_feed_worker(state: Arc<AppState>) {
    let mut rx = match state.take_change_rx() {
        Some(rx) => rx,
        None => {
            error!("Change feed worker already started");
            return;
        }
    };

    // Embed faults left without an embedding by a previous session
    let catchup_state = state.clone();
    tokio::spawn(async move {
        let report = backfill_pending(&catchup_state).await;
        if report != BackfillReport::default() {
            info!(
                "Catch-up backfill: {} embedded, {} already embedded, {} failed",
                report.embedded, report.already_embedded, report.failed
            );
        }
    });

    tokio::spawn(async move {
        info!("Change feed worker started");
        while let Some(event) = rx.recv().await {
            let state = state.clone();
            tokio::spawn(async move {
                let _ = dispatch(&state, &event).await;
            });
        }
        info!("Change feed worker stopped");
    });
}

/// Run the generator for one event and update the worker counters.
pub async fn dispatch(state: &AppState, event: &ChangeEvent) -> Result<GeneratorOutcome> {
    let result = state.generator.handle(event).await;
    match &result {
        Ok(GeneratorOutcome::Skipped) => state.feed_stats.record_skipped(),
        Ok(outcome) => {
            debug!("Change event handled: {:?}", outcome);
            state.feed_stats.record_processed();
        }
        Err(e) => {
            error!("Failed to handle change event: {}", e);
            state.feed_stats.record_failed();
        }
    }
    result
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub embedded: usize,
    /// Faults embedded concurrently by another worker while the backfill ran.
    pub already_embedded: usize,
    pub failed: usize,
}

impl BackfillReport {
    /// Count one generator result. Returns whether the fault no longer needs an embedding.
    fn record(&mut self, result: &Result<GeneratorOutcome>) -> bool {
        match result {
            Ok(GeneratorOutcome::Embedded { .. }) => self.embedded += 1,
            Ok(GeneratorOutcome::AlreadyEmbedded { .. }) => self.already_embedded += 1,
            Ok(GeneratorOutcome::Skipped) => return false,
            Err(_) => {
                self.failed += 1;
                return false;
            }
        }
        true
    }
}

/// Feed every fault without an embedding through the generator as a synthetic insert.
///
/// Stops when nothing is pending or a whole round makes no progress.
pub async fn backfill_pending(state: &AppState) -> BackfillReport {
    let mut report = BackfillReport::default();

    if !state.backends.embedder.is_available() {
        info!("Embedding backend unavailable, skipping backfill");
        return report;
    }

    loop {
        let pending = match state.store.get_faults_without_embedding(BACKFILL_BATCH) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to list faults pending embedding: {}", e);
                break;
            }
        };
        if pending.is_empty() {
            break;
        }

        let mut progressed = false;
        for fault in &pending {
            let event = match ChangeEvent::fault_insert(fault) {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping fault {} in backfill: {}", fault.fault_id, e);
                    report.failed += 1;
                    continue;
                }
            };
            let result = dispatch(state, &event).await;
            if report.record(&result) {
                progressed = true;
            }
        }

        if !progressed {
            warn!("Backfill round made no progress, stopping");
            break;
        }
    }

    report
}
