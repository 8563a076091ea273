//! Query orchestration: resolve, classify the seed, search, categorize

use super::classify::categorize_paths;
use super::deadline::Deadline;
use super::error::{NavResult, NavigationError};
use super::policy::{NavigationPolicy, SearchPolicy};
use super::search::PathSearch;
use super::types::{CognitiveZone, EntitySummary, NavigationResult, NoPathReason, ZoneMetrics};
use super::zone::{classify, ZoneEvaluator};
use crate::graph::{Entity, GraphSnapshot, ResolveError};
use crate::storage::GraphStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// A navigation request
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationQuery {
    /// Seed reference: entity id, external reference, or unique name
    pub seed: String,
    /// Optional goal reference; without one the query explores
    pub goal: Option<String>,
    pub max_hops: usize,
    pub max_paths: usize,
}

impl NavigationQuery {
    /// Create an explore query with the default bounds
    pub fn from(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            goal: None,
            max_hops: 3,
            max_paths: 3,
        }
    }

    /// Navigate towards a goal instead of exploring
    pub fn toward(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    fn validate(&self, limits: &SearchPolicy) -> NavResult<()> {
        if self.max_hops == 0 {
            return Err(NavigationError::InvalidQuery("max_hops must be at least 1".into()));
        }
        if self.max_hops > limits.max_hops_limit {
            return Err(NavigationError::InvalidQuery(format!(
                "max_hops {} exceeds the limit of {}",
                self.max_hops, limits.max_hops_limit
            )));
        }
        if self.max_paths == 0 {
            return Err(NavigationError::InvalidQuery("max_paths must be at least 1".into()));
        }
        Ok(())
    }
}

/// Stateless navigation engine over a graph store.
///
/// Every call pins one snapshot of the store and computes its answer from
/// that snapshot alone. Nothing is cached between calls.
#[derive(Clone)]
pub struct Navigator {
    store: Arc<dyn GraphStore>,
    policy: Arc<NavigationPolicy>,
}

impl Navigator {
    pub fn new(store: Arc<dyn GraphStore>, policy: impl Into<Arc<NavigationPolicy>>) -> Self {
        Self {
            store,
            policy: policy.into(),
        }
    }

    pub fn policy(&self) -> &NavigationPolicy {
        &self.policy
    }

    /// Navigate from `seed`, towards `goal` if given
    pub fn navigate(
        &self,
        seed: &str,
        goal: Option<&str>,
        max_hops: usize,
        max_paths: usize,
    ) -> NavResult<NavigationResult> {
        let mut query = NavigationQuery::from(seed)
            .max_hops(max_hops)
            .max_paths(max_paths);
        query.goal = goal.map(str::to_string);
        self.execute(&query)
    }

    /// Run a prepared query
    pub fn execute(&self, query: &NavigationQuery) -> NavResult<NavigationResult> {
        query.validate(&self.policy.search)?;
        let deadline = Deadline::after(Duration::from_millis(self.policy.search.timeout_ms));
        let snapshot = self.store.snapshot()?;

        let seed = resolve(&snapshot, &query.seed)?;
        let goal = query
            .goal
            .as_deref()
            .map(|reference| resolve(&snapshot, reference))
            .transpose()?;

        let zones = ZoneEvaluator::new(&snapshot, &self.policy.zone);
        let seed_metrics = zones.compute_zone_metrics(&seed.id)?;
        let current_zone = classify(&seed_metrics, &self.policy.zone);

        let mut result = NavigationResult {
            seed: EntitySummary::from(seed),
            goal: goal.map(EntitySummary::from),
            current_zone,
            zone_description: current_zone.description().to_string(),
            paths: Vec::new(),
            no_path_reason: None,
            timestamp: Utc::now(),
            graph_version: snapshot.version(),
        };

        if goal.is_some_and(|g| g.id == seed.id) {
            return Ok(no_path(result, NoPathReason::AlreadyAtGoal));
        }
        if snapshot.degree(&seed.id) == 0 {
            return Ok(no_path(result, NoPathReason::NoEvidenceEdges));
        }

        let search = PathSearch::new(
            &zones,
            &self.policy.weights,
            &self.policy.search,
            deadline,
        );
        let candidates = match goal {
            Some(goal) => search.find_paths(&seed.id, &goal.id, query.max_hops)?,
            None => search.explore(&seed.id, query.max_hops)?,
        };
        if candidates.is_empty() {
            let reason = match goal {
                Some(_) => NoPathReason::GoalUnreachable {
                    max_hops: query.max_hops,
                },
                None => NoPathReason::NoEvidenceEdges,
            };
            return Ok(no_path(result, reason));
        }

        let mut paths = categorize_paths(
            &candidates,
            &seed_metrics.coverage_sources,
            &self.policy.scoring,
        )?;
        deadline.check()?;
        if paths.is_empty() {
            let reason = NoPathReason::FilteredByRiskPolicy {
                candidates: candidates.len(),
            };
            return Ok(no_path(result, reason));
        }
        paths.truncate(query.max_paths);

        tracing::debug!(
            seed = %seed.id,
            candidates = candidates.len(),
            categories = ?paths.iter().map(|p| p.path_type.as_str()).collect::<Vec<_>>(),
            version = %result.graph_version,
            "navigation complete"
        );
        result.paths = paths;
        Ok(result)
    }

    /// Zone of one entity in the current graph
    pub fn detect_zone(&self, reference: &str) -> NavResult<CognitiveZone> {
        let snapshot = self.store.snapshot()?;
        let entity = resolve(&snapshot, reference)?;
        ZoneEvaluator::new(&snapshot, &self.policy.zone).detect_zone(&entity.id)
    }

    /// Evidence metrics of one entity in the current graph
    pub fn compute_zone_metrics(&self, reference: &str) -> NavResult<ZoneMetrics> {
        let snapshot = self.store.snapshot()?;
        let entity = resolve(&snapshot, reference)?;
        ZoneEvaluator::new(&snapshot, &self.policy.zone).compute_zone_metrics(&entity.id)
    }
}

fn resolve<'s>(snapshot: &'s GraphSnapshot, reference: &str) -> NavResult<&'s Entity> {
    snapshot.resolve(reference).map_err(|e| match e {
        ResolveError::NotFound => NavigationError::NotFound(reference.to_string()),
        ResolveError::Ambiguous(matches) => NavigationError::AmbiguousReference {
            reference: reference.to_string(),
            matches,
        },
    })
}

fn no_path(mut result: NavigationResult, reason: NoPathReason) -> NavigationResult {
    tracing::warn!(seed = %result.seed.id, %reason, "no path returned");
    result.no_path_reason = Some(reason.to_string());
    result
}
