//! Collaborator trait definitions for the drift pipeline.

use chrono::Duration;
use serde_json::Value;

use super::error::StoreResult;
use crate::drift::{DriftReport, EmbeddingSet};

/// Source of reference and recent embedding populations.
///
/// Backed externally by a blob store; documents are JSON with an
/// `embeddings` field holding a nested numeric array.
pub trait EmbeddingStore {
    /// The fixed training-time reference set.
    fn load_reference(&self) -> StoreResult<EmbeddingSet>;

    /// Production embeddings captured within the trailing `window`.
    /// May be empty when there was no traffic.
    fn load_recent(&self, window: Duration) -> StoreResult<EmbeddingSet>;
}

/// Outbound notification channel.
///
/// Fire-and-forget from the pipeline's perspective: the drift job logs
/// publish failures and never propagates them.
pub trait AlertSink {
    /// Publish one alert message.
    fn publish(&mut self, subject: &str, body: &Value) -> StoreResult<()>;
}

/// Historical persistence for drift reports.
pub trait ResultSink {
    /// Persist a report, keyed by its timestamp.
    fn store(&mut self, report: &DriftReport) -> StoreResult<()>;
}
