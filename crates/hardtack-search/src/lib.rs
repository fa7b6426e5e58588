//! Multi-dimension recipe retrieval.
//!
//! A [`QuerySpec`] is planned into one nearest-neighbor call per active
//! dimension. The calls run concurrently on a single vector session, their hits
//! are merged into a [`DistanceMap`], scored, ranked, and the top ids are
//! resolved into full records.

use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use hardtack_core::config::RetrievalSettings;
use hardtack_core::error::{Error, Result};
use hardtack_core::query::QuerySpec;
use hardtack_core::traits::{RecordStore, VectorSession, VectorStore};
use hardtack_core::types::{DimensionFailure, Recipe, RecipeId, SearchHit};

pub mod aggregate;
pub mod materialize;
pub mod planner;

pub use aggregate::{DistanceMap, RankedRecipe, ScoreMap, PENALTY_DISTANCE};
pub use materialize::materialize;
pub use planner::{PlannedDimension, QueryPlan};

/// A recovered problem that left the result usable but degraded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrievalWarning {
    DimensionFailed(DimensionFailure),
    OrphanedRecord { id: RecipeId, reason: String },
}

impl fmt::Display for RetrievalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalWarning::DimensionFailed(failure) => write!(f, "dimension {} failed: {}", failure.dimension, failure.reason),
            RetrievalWarning::OrphanedRecord { id, reason } => write!(f, "no record for ranked id {id}: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievedRecipes {
    /// `recipe_1..recipe_k` in rank order.
    pub recipes: IndexMap<String, Recipe>,
    pub ranked: Vec<RankedRecipe>,
    pub warnings: Vec<RetrievalWarning>,
}

impl RetrievedRecipes {
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }
}

pub struct RecipeRetriever<V, R> {
    store: V,
    records: R,
    settings: RetrievalSettings,
}

impl<V, R> RecipeRetriever<V, R>
where
    V: VectorStore,
    R: RecordStore,
{
    pub fn new(store: V, records: R) -> Self {
        Self { store, records, settings: RetrievalSettings::default() }
    }

    pub fn with_settings(mut self, settings: RetrievalSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub async fn retrieve(&self, spec: &QuerySpec) -> Result<RetrievedRecipes> {
        self.retrieve_top(spec, self.settings.top_n).await
    }

    pub async fn retrieve_top(&self, spec: &QuerySpec, top_n: usize) -> Result<RetrievedRecipes> {
        let plan = QueryPlan::from_spec(spec);
        if plan.is_empty() {
            debug!("no active dimensions, nothing to search");
            return Ok(RetrievedRecipes::default());
        }
        let mut warnings = Vec::new();
        let ranked = self.rank(&plan, top_n, &mut warnings).await?;
        let recipes = materialize(&self.records, &ranked, self.settings.query_timeout(), &mut warnings).await;
        info!(dimensions = plan.len(), ranked = ranked.len(), returned = recipes.len(), warnings = warnings.len(), "retrieval complete");
        Ok(RetrievedRecipes { recipes, ranked, warnings })
    }

    /// Runs `plan` against the vector store and ranks the merged hits.
    /// The session is closed before this returns, whatever the outcome.
    pub async fn rank(&self, plan: &QueryPlan, top_n: usize, warnings: &mut Vec<RetrievalWarning>) -> Result<Vec<RankedRecipe>> {
        let timeout = self.settings.query_timeout();
        let connected = match tokio::time::timeout(timeout, self.store.connect()).await {
            Ok(result) => result.map_err(|e| format!("connection failed: {e:#}")),
            Err(_) => Err(format!("connection timed out after {} ms", timeout.as_millis())),
        };
        let session = match connected {
            Ok(session) => session,
            Err(reason) => {
                warn!(%reason, "vector store connection failed");
                let failures = plan.dimensions.iter().map(|p| DimensionFailure { dimension: p.dimension, reason: reason.clone() }).collect();
                return Err(Error::QueryFailed { failures });
            }
        };
        let outcomes = self.search_dimensions(session.as_ref(), plan).await;
        match tokio::time::timeout(timeout, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "failed to close vector session"),
            Err(_) => warn!(timeout_ms = timeout.as_millis() as u64, "closing vector session timed out"),
        }

        let mut distances = DistanceMap::new();
        let mut failures = Vec::new();
        for (planned, outcome) in plan.dimensions.iter().zip(outcomes) {
            match outcome {
                Ok(hits) => {
                    debug!(dimension = %planned.dimension, query = %planned.query_text, hits = hits.len(), "dimension hits");
                    distances.extend(planned.dimension, hits);
                }
                Err(reason) => {
                    warn!(dimension = %planned.dimension, %reason, "dimension query failed, treating as no hits");
                    failures.push(DimensionFailure { dimension: planned.dimension, reason });
                }
            }
        }
        if failures.len() == plan.len() {
            return Err(Error::QueryFailed { failures });
        }
        warnings.extend(failures.into_iter().map(RetrievalWarning::DimensionFailed));

        let scores = distances.scores(&plan.active_dimensions());
        let ranked = scores.ranked(top_n);
        debug!(candidates = scores.len(), ranked = ?ranked, "scored candidates");
        Ok(ranked)
    }

    async fn search_dimensions(&self, session: &dyn VectorSession, plan: &QueryPlan) -> Vec<std::result::Result<Vec<SearchHit>, String>> {
        let timeout = self.settings.query_timeout();
        let limit = self.settings.num_matches;
        let predicate = plan.predicate.as_ref();
        let calls = plan.dimensions.iter().map(|planned| async move {
            match tokio::time::timeout(timeout, session.nearest(planned.dimension, &planned.query_text, limit, predicate)).await {
                Ok(Ok(hits)) => Ok(hits),
                Ok(Err(e)) => Err(format!("{e:#}")),
                Err(_) => Err(format!("timed out after {} ms", timeout.as_millis())),
            }
        });
        join_all(calls).await
    }
}
