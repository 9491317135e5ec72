//! Model Registry and Experiment Store
//!
//! Types for experiment runs and registered model versions, plus the
//! [`ExperimentStore`] trait abstracting the external tracking service.
//! The trait replaces module-global client singletons with an explicit,
//! dependency-injected collaborator so callers can substitute test doubles.
//!
//! [`InMemoryRegistry`] is a complete in-process implementation, useful both
//! for tests and for pipelines that do not talk to a remote tracking server.


use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle stage of a registered model version.
///
/// Versions start at [`Stage::None`] and move between stages only through
/// an explicit transition call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Registered but not yet assigned to any stage.
    None,
    /// Under validation.
    Staging,
    /// Serving live traffic.
    Production,
    /// Retired.
    Archived,
}

impl Stage {
    /// Display name for the stage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::None => "None",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an experiment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is actively recording.
    Active,
    /// Run completed successfully.
    Completed,
    /// Run failed.
    Failed,
    /// Run was cancelled.
    Cancelled,
}

/// A recorded training/evaluation run.
///
/// Sourced from the external tracking store; read-only from the
/// perspective of ranking and promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRun {
    /// Unique identifier.
    pub run_id: String,
    /// Optional human-readable name.
    pub run_name: Option<String>,
    /// Current status.
    pub status: RunStatus,
    /// Unix timestamp (ms) when the run started.
    pub start_time_ms: Option<u64>,
    /// Unix timestamp (ms) when the run ended.
    pub end_time_ms: Option<u64>,
    /// Metric name -> final value.
    pub metrics: HashMap<String, f64>,
    /// Parameter name -> string-encoded value.
    pub params: HashMap<String, String>,
}

impl ExperimentRun {
    /// A completed run with the given id and no metrics or parameters.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            run_name: None,
            status: RunStatus::Completed,
            start_time_ms: None,
            end_time_ms: None,
            metrics: HashMap::new(),
            params: HashMap::new(),
        }
    }

    /// Attach a metric value.
    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Attach a parameter value.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the start timestamp (ms since the Unix epoch).
    #[must_use]
    pub fn with_start_time(mut self, start_time_ms: u64) -> Self {
        self.start_time_ms = Some(start_time_ms);
        self
    }

    /// Set the human-readable run name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.run_name = Some(name.into());
        self
    }
}

/// A named experiment grouping runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experiment {
    /// Store-assigned identifier.
    pub experiment_id: String,
    /// Human-readable name.
    pub name: String,
}

/// A registered model version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Registered model name.
    pub name: String,
    /// Version identifier within the model.
    pub version: String,
    /// Current lifecycle stage.
    pub stage: Stage,
    /// The run that produced this version.
    pub run_id: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// When this version was registered.
    pub created_at: DateTime<Utc>,
}

impl ModelVersion {
    /// A new version at [`Stage::None`], created now.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            stage: Stage::None,
            run_id: run_id.into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Sort order for run queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunOrder {
    /// Newest runs first (the order ranking assumes for tie-breaking).
    #[default]
    StartTimeDesc,
    /// Oldest runs first.
    StartTimeAsc,
}

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No experiment with this name exists.
    #[error("experiment not found: {0}")]
    ExperimentNotFound(String),

    /// No version with this (name, version) pair exists.
    #[error("model version not found: {name} v{version}")]
    VersionNotFound { name: String, version: String },

    /// Underlying I/O failure from the tracking service.
    #[error("registry transport error: {0}")]
    Transport(String),
}

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// The external tracking/registry service, as seen by this crate.
///
/// Lookups distinguish "not found" from transport failures so callers can
/// tell "no data" apart from "store unreachable" without inspecting error
/// strings.
pub trait ExperimentStore {
    /// Look up an experiment by name.
    fn get_experiment(&self, name: &str) -> Result<Experiment>;

    /// Query runs of an experiment, sorted per `order`, truncated to
    /// `max_results`.
    fn search_runs(
        &self,
        experiment_id: &str,
        order: RunOrder,
        max_results: usize,
    ) -> Result<Vec<ExperimentRun>>;

    /// All versions registered under a model name, in registration order.
    fn search_model_versions(&self, name: &str) -> Result<Vec<ModelVersion>>;

    /// Move a version to a new lifecycle stage. The registry serializes
    /// this; it is the only permitted mutation of a version's stage.
    fn transition_stage(&mut self, name: &str, version: &str, stage: Stage)
        -> Result<ModelVersion>;

    /// Replace a version's description.
    fn update_description(&mut self, name: &str, version: &str, text: &str) -> Result<()>;

    /// For each requested stage, the most recently created version of the
    /// model at that stage, if any.
    fn get_latest_versions(&self, name: &str, stages: &[Stage]) -> Result<Vec<ModelVersion>>;
}

/// In-process experiment store.
///
/// Keeps experiments, runs, and model versions in memory. Versions are held
/// in registration order, which is the order `search_model_versions`
/// returns them in.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    experiments: HashMap<String, Experiment>,
    runs: HashMap<String, Vec<ExperimentRun>>,
    versions: Vec<ModelVersion>,
    next_experiment_id: u64,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an experiment, returning its handle. Re-creating an existing
    /// name returns the existing experiment.
    pub fn create_experiment(&mut self, name: &str) -> Experiment {
        if let Some(existing) = self.experiments.get(name) {
            return existing.clone();
        }
        self.next_experiment_id += 1;
        let experiment = Experiment {
            experiment_id: format!("exp-{}", self.next_experiment_id),
            name: name.to_string(),
        };
        self.experiments
            .insert(name.to_string(), experiment.clone());
        experiment
    }

    /// Record a run under an experiment.
    pub fn log_run(&mut self, experiment_id: &str, run: ExperimentRun) {
        self.runs
            .entry(experiment_id.to_string())
            .or_default()
            .push(run);
    }

    /// Register a model version.
    pub fn register_version(&mut self, version: ModelVersion) {
        self.versions.push(version);
    }

    fn version_mut(&mut self, name: &str, version: &str) -> Result<&mut ModelVersion> {
        self.versions
            .iter_mut()
            .find(|v| v.name == name && v.version == version)
            .ok_or_else(|| RegistryError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
    }
}

impl ExperimentStore for InMemoryRegistry {
    fn get_experiment(&self, name: &str) -> Result<Experiment> {
        self.experiments
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ExperimentNotFound(name.to_string()))
    }

    fn search_runs(
        &self,
        experiment_id: &str,
        order: RunOrder,
        max_results: usize,
    ) -> Result<Vec<ExperimentRun>> {
        let mut runs = self.runs.get(experiment_id).cloned().unwrap_or_default();
        match order {
            RunOrder::StartTimeDesc => runs.sort_by(|a, b| b.start_time_ms.cmp(&a.start_time_ms)),
            RunOrder::StartTimeAsc => runs.sort_by(|a, b| a.start_time_ms.cmp(&b.start_time_ms)),
        }
        runs.truncate(max_results);
        Ok(runs)
    }

    fn search_model_versions(&self, name: &str) -> Result<Vec<ModelVersion>> {
        Ok(self
            .versions
            .iter()
            .filter(|v| v.name == name)
            .cloned()
            .collect())
    }

    fn transition_stage(
        &mut self,
        name: &str,
        version: &str,
        stage: Stage,
    ) -> Result<ModelVersion> {
        let mv = self.version_mut(name, version)?;
        mv.stage = stage;
        Ok(mv.clone())
    }

    fn update_description(&mut self, name: &str, version: &str, text: &str) -> Result<()> {
        let mv = self.version_mut(name, version)?;
        mv.description = Some(text.to_string());
        Ok(())
    }

    fn get_latest_versions(&self, name: &str, stages: &[Stage]) -> Result<Vec<ModelVersion>> {
        let mut latest = Vec::new();
        for &stage in stages {
            if let Some(mv) = self
                .versions
                .iter()
                .filter(|v| v.name == name && v.stage == stage)
                .max_by_key(|v| v.created_at)
            {
                latest.push(mv.clone());
            }
        }
        Ok(latest)
    }
}
