//! Pipeline Collaborators
//!
//! Traits for the external services the drift pipeline touches — embedding
//! storage, alert publishing, report persistence — plus JSON-file and
//! in-memory implementations. Promotion's collaborator lives in
//! [`crate::registry`] as [`ExperimentStore`](crate::registry::ExperimentStore).

mod error;
mod in_memory;
mod json_file;
mod traits;


pub use error::{StoreError, StoreResult};
pub use in_memory::{InMemoryEmbeddingStore, MemoryAlertSink, MemoryResultSink};
pub use json_file::{JsonFileEmbeddingStore, JsonFileResultSink};
pub use traits::{AlertSink, EmbeddingStore, ResultSink};

use serde_json::Value;
use tracing::info;

/// Alert sink that writes alerts to the log instead of a notification
/// topic. A reasonable default for pipelines without an outbound channel.
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn publish(&mut self, subject: &str, body: &Value) -> StoreResult<()> {
        info!(subject, body = %body, "alert published");
        Ok(())
    }
}
