//! Model Ranking and Promotion
//!
//! Ranks experiment runs by a metric and moves registered model versions
//! between lifecycle stages through an [`ExperimentStore`].
//!
//! Ranking is pure: it consumes a run list supplied by the caller (assumed
//! to be in the store's start-time-descending query order) and is
//! deterministic for a fixed input. Promotion issues one stage-transition
//! call against the registry; the registry is the source of truth and
//! serializes concurrent transitions.
//!
//! # Example
//!
//! ```
//! use vigia::promote::ModelPromoter;
//! use vigia::registry::{ExperimentRun, InMemoryRegistry};
//!
//! let promoter = ModelPromoter::new(InMemoryRegistry::new());
//! let runs = vec![
//!     ExperimentRun::new("a").with_metric("loss", 0.5),
//!     ExperimentRun::new("b").with_metric("loss", 0.2),
//! ];
//! let ranking = promoter.rank(&runs, "loss", 1, true);
//! assert_eq!(ranking.entries[0].run.run_id, "b");
//! assert_eq!(ranking.entries[0].value, 0.2);
//! ```


use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::registry::{
    ExperimentRun, ExperimentStore, ModelVersion, RegistryError, RunOrder, Stage,
};

/// Errors from promotion operations.
///
/// Registry failures are caught at each external-call boundary and wrapped
/// here, never propagated raw.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// No run carried the selection metric, or no registered version
    /// references the best run.
    #[error("no candidate model version to promote")]
    NoCandidate,

    /// A registry call failed: an experiment or version lookup, or the
    /// stage transition itself.
    #[error("registry call failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Result alias for promotion operations.
pub type Result<T> = std::result::Result<T, PromotionError>;

/// One run paired with its value for the ranking metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRun {
    /// The run.
    pub run: ExperimentRun,
    /// Its value for the requested metric.
    pub value: f64,
}

/// Runs ordered by a metric, truncated to the requested top-K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    /// The metric the entries are sorted by.
    pub metric: String,
    /// Ordered (run, value) pairs, best first.
    pub entries: Vec<RankedRun>,
}

impl RankingResult {
    /// True if no runs carried the metric.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A model version joined with the metrics and parameters of its backing
/// run, for side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    /// Version identifier.
    pub version: String,
    /// Current lifecycle stage.
    pub stage: Stage,
    /// The run that produced this version.
    pub run_id: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Version description, if any.
    pub description: Option<String>,
    /// Metrics of the backing run.
    pub metrics: HashMap<String, f64>,
    /// Parameters of the backing run.
    pub params: HashMap<String, String>,
}

/// Join model versions with their backing runs.
///
/// Versions whose run does not appear in `runs` are skipped with a warning,
/// matching the comparison report's tolerate-and-continue behavior.
#[must_use]
pub fn version_summaries(
    versions: &[ModelVersion],
    runs: &[ExperimentRun],
) -> Vec<VersionSummary> {
    versions
        .iter()
        .filter_map(|mv| {
            let Some(run) = runs.iter().find(|r| r.run_id == mv.run_id) else {
                warn!(
                    name = %mv.name,
                    version = %mv.version,
                    run_id = %mv.run_id,
                    "skipping version with no backing run data"
                );
                return None;
            };
            Some(VersionSummary {
                version: mv.version.clone(),
                stage: mv.stage,
                run_id: mv.run_id.clone(),
                created_at: mv.created_at,
                description: mv.description.clone(),
                metrics: run.metrics.clone(),
                params: run.params.clone(),
            })
        })
        .collect()
}

/// Ranks experiment runs and transitions model versions between stages.
///
/// Stateless between calls; the injected store is the only collaborator.
#[derive(Debug)]
pub struct ModelPromoter<S: ExperimentStore> {
    store: S,
}

impl<S: ExperimentStore> ModelPromoter<S> {
    /// Create a promoter over the given experiment store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Rank runs by `metric`, best first.
    ///
    /// Runs lacking the metric are dropped. The sort is stable, so ties
    /// keep the input's relative order (the store queries runs newest
    /// first). Zero matching runs yields an empty result, not an error —
    /// "no matching runs" is an expected condition, distinct from a store
    /// failure.
    #[must_use]
    pub fn rank(
        &self,
        runs: &[ExperimentRun],
        metric: &str,
        top_k: usize,
        ascending: bool,
    ) -> RankingResult {
        let mut entries: Vec<RankedRun> = runs
            .iter()
            .filter_map(|run| {
                run.metrics
                    .get(metric)
                    .map(|&value| RankedRun { run: run.clone(), value })
            })
            .collect();

        entries.sort_by(|a, b| {
            let ord = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        entries.truncate(top_k);

        RankingResult {
            metric: metric.to_string(),
            entries,
        }
    }

    /// Query an experiment's runs from the store and rank them.
    pub fn rank_experiment(
        &self,
        experiment_name: &str,
        metric: &str,
        top_k: usize,
        ascending: bool,
    ) -> Result<RankingResult> {
        let experiment = self.store.get_experiment(experiment_name)?;
        let runs =
            self.store
                .search_runs(&experiment.experiment_id, RunOrder::StartTimeDesc, usize::MAX)?;
        Ok(self.rank(&runs, metric, top_k, ascending))
    }

    /// The id of the best run for `metric`, or `None` if no run carries it.
    #[must_use]
    pub fn find_best(&self, runs: &[ExperimentRun], metric: &str, minimize: bool) -> Option<String> {
        self.rank(runs, metric, 1, minimize)
            .entries
            .first()
            .map(|e| e.run.run_id.clone())
    }

    /// Transition a model version to `target`, optionally updating its
    /// description.
    ///
    /// The description update is a second registry call issued only after
    /// the transition succeeds. If it fails, the promotion still counts as
    /// successful: the primary effect outranks the metadata update, and the
    /// failure is logged.
    pub fn promote(
        &mut self,
        model: &str,
        version: &str,
        target: Stage,
        description: Option<&str>,
    ) -> Result<()> {
        info!(model, version, stage = %target, "promoting model version");
        self.store.transition_stage(model, version, target)?;

        if let Some(text) = description {
            if let Err(e) = self.store.update_description(model, version, text) {
                warn!(
                    model,
                    version,
                    error = %e,
                    "description update failed after successful stage transition"
                );
            }
        }
        Ok(())
    }

    /// Find the best run for `metric` and promote the model version built
    /// from it.
    ///
    /// The version lookup is a linear first-match-wins scan over `versions`
    /// by run id. If several versions reference the same run, the first in
    /// the input ordering wins — inherited behavior whose intent the
    /// original never resolved, preserved as-is.
    pub fn auto_promote_best(
        &mut self,
        runs: &[ExperimentRun],
        versions: &[ModelVersion],
        metric: &str,
        minimize: bool,
        target: Stage,
    ) -> Result<()> {
        let ranking = self.rank(runs, metric, 1, minimize);
        let Some(best) = ranking.entries.first() else {
            warn!(metric, "no runs carry the selection metric");
            return Err(PromotionError::NoCandidate);
        };

        let Some(candidate) = versions.iter().find(|v| v.run_id == best.run.run_id) else {
            warn!(run_id = %best.run.run_id, "no registered version references the best run");
            return Err(PromotionError::NoCandidate);
        };

        let description = format!("Auto-promoted best model with {metric}={}", best.value);
        let name = candidate.name.clone();
        let version = candidate.version.clone();
        self.promote(&name, &version, target, Some(&description))
    }
}
