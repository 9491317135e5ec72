//! vigia — drift detection and model promotion for ML pipelines
//!
//! Two independent decision cores, each stateless per call:
//!
//! - [`drift`]: compares a reference (training-time) embedding population
//!   against a recent (production) window and flags statistical drift.
//! - [`promote`]: ranks experiment runs by a metric and transitions
//!   registered model versions between lifecycle stages.
//!
//! Collaborator I/O is abstracted behind traits ([`store`] for embeddings,
//! alerts, and report persistence; [`registry`] for the experiment/model
//! store), so both cores can run against a remote tracking service or
//! in-process test doubles. [`job`] wires the drift core and its
//! collaborators into a single scheduled check.
//!
//! # Example
//!
//! ```
//! use vigia::{DriftDetector, DriftThresholds, EmbeddingSet};
//!
//! # fn main() -> Result<(), vigia::DriftError> {
//! let reference = EmbeddingSet::new(vec![vec![0.0, 1.0]; 50])?;
//! let recent = EmbeddingSet::new(vec![vec![5.0, 9.0]; 20])?;
//!
//! let detector = DriftDetector::new(DriftThresholds::default());
//! let report = detector.detect(&reference, &recent)?;
//! assert!(detector.is_drifted(&report));
//! # Ok(())
//! # }
//! ```

pub mod drift;
pub mod job;
pub mod promote;
pub mod registry;
pub mod store;

pub use drift::{DriftDetector, DriftError, DriftReport, DriftThresholds, EmbeddingSet};
pub use job::{DriftJob, DriftJobConfig, DriftJobError, DriftOutcome};
pub use promote::{ModelPromoter, PromotionError, RankedRun, RankingResult};
pub use registry::{
    ExperimentRun, ExperimentStore, InMemoryRegistry, ModelVersion, RegistryError, RunStatus,
    Stage,
};
