//! In-memory collaborator implementations.
//!
//! Useful as test doubles and for driving the drift job against data
//! already resident in the process.

use chrono::Duration;
use serde_json::Value;

use super::error::StoreResult;
use super::traits::{AlertSink, EmbeddingStore, ResultSink};
use crate::drift::{DriftReport, EmbeddingSet};

/// Embedding store serving fixed in-memory sets.
///
/// The recency window is ignored; `load_recent` always returns the full
/// recent set it was constructed with.
#[derive(Debug, Clone)]
pub struct InMemoryEmbeddingStore {
    reference: EmbeddingSet,
    recent: EmbeddingSet,
}

impl InMemoryEmbeddingStore {
    /// Create a store over the given sets.
    #[must_use]
    pub fn new(reference: EmbeddingSet, recent: EmbeddingSet) -> Self {
        Self { reference, recent }
    }
}

impl EmbeddingStore for InMemoryEmbeddingStore {
    fn load_reference(&self) -> StoreResult<EmbeddingSet> {
        Ok(self.reference.clone())
    }

    fn load_recent(&self, _window: Duration) -> StoreResult<EmbeddingSet> {
        Ok(self.recent.clone())
    }
}

/// Alert sink collecting published messages in memory.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    /// Published (subject, body) pairs, in publish order.
    pub alerts: Vec<(String, Value)>,
}

impl MemoryAlertSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertSink for MemoryAlertSink {
    fn publish(&mut self, subject: &str, body: &Value) -> StoreResult<()> {
        self.alerts.push((subject.to_string(), body.clone()));
        Ok(())
    }
}

/// Result sink collecting reports in memory.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    /// Stored reports, in store order.
    pub reports: Vec<DriftReport>,
}

impl MemoryResultSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemoryResultSink {
    fn store(&mut self, report: &DriftReport) -> StoreResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
