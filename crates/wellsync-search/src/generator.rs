//! Embedding generator: turns a fault insert event into one stored embedding.

use std::sync::Arc;

use tracing::{debug, info};
use wellsync_core::{Error, Result};
use wellsync_infer::{EmbedIntent, EmbeddingBackend};

use crate::ports::EmbeddingSink;
use crate::types::{validate_embedding, ChangeEvent, GeneratorOutcome, InsertedFault};

/// Placeholder for a missing fault type or status in the canonical text.
const UNKNOWN: &str = "Unknown";

/// Deterministic text a fault is embedded from.
pub fn canonical_text(fault_type: Option<&str>, status: Option<&str>) -> String {
    format!(
        "Fault Type: {}. Status: {}.",
        fault_type.unwrap_or(UNKNOWN),
        status.unwrap_or(UNKNOWN)
    )
}

pub struct EmbeddingGenerator {
    embedder: Arc<dyn EmbeddingBackend>,
    sink: Arc<dyn EmbeddingSink>,
}

impl EmbeddingGenerator {
    pub fn new(embedder: Arc<dyn EmbeddingBackend>, sink: Arc<dyn EmbeddingSink>) -> Self {
        Self { embedder, sink }
    }

    /// Handle one change event.
    ///
    /// Events other than fault inserts are skipped without touching the provider.
    /// A redelivered insert for a fault that already has its embedding is a no-op.
    pub async fn handle(&self, event: &ChangeEvent) -> Result<GeneratorOutcome> {
        if !event.is_fault_insert() {
            debug!(kind = %event.kind, table = %event.table, "Ignoring change event");
            return Ok(GeneratorOutcome::Skipped);
        }

        let fault = InsertedFault::from_event(event)?;

        let already_embedded = self.sink.has_embedding(&fault.fault_id).map_err(|e| {
            Error::Storage(format!(
                "Failed to check embedding for fault {}: {}",
                fault.fault_id, e
            ))
        })?;
        if already_embedded {
            info!(fault_id = %fault.fault_id, "Fault already embedded, skipping");
            return Ok(GeneratorOutcome::AlreadyEmbedded {
                fault_id: fault.fault_id,
            });
        }

        let text = canonical_text(fault.fault_type.as_deref(), fault.status.as_deref());
        debug!(fault_id = %fault.fault_id, text = %text, "Generating fault embedding");

        let mut vectors = self
            .embedder
            .embed(&[text], EmbedIntent::Document)
            .await
            .map_err(|e| Error::Inference(format!("Failed to generate embedding: {}", e)))?;

        if vectors.len() != 1 {
            return Err(Error::Inference(format!(
                "Expected exactly one embedding from provider, got {}",
                vectors.len()
            )));
        }
        let embedding = vectors.swap_remove(0);
        validate_embedding(&embedding)?;

        match self.sink.store_embedding(&fault.fault_id, &embedding) {
            Ok(()) => {}
            // Lost a race with a concurrent invocation for the same fault
            Err(Error::DuplicateEmbedding(_)) => {
                info!(fault_id = %fault.fault_id, "Fault embedded concurrently, skipping");
                return Ok(GeneratorOutcome::AlreadyEmbedded {
                    fault_id: fault.fault_id,
                });
            }
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Failed to store embedding for fault {}: {}",
                    fault.fault_id, e
                )))
            }
        }

        info!(
            fault_id = %fault.fault_id,
            dimension = embedding.len(),
            "Stored fault embedding"
        );
        Ok(GeneratorOutcome::Embedded {
            fault_id: fault.fault_id,
            dimension: embedding.len(),
        })
    }
}
