//! Async facade over the navigation engine.
//!
//! `NavigationService` is the entry point for async callers (HTTP handlers,
//! task runners). The engine itself is synchronous and CPU-bound, so every
//! call runs on the blocking pool under the policy's latency budget.

use std::sync::Arc;
use std::time::Duration;

use crate::navigation::{
    CognitiveZone, NavResult, NavigationError, NavigationPolicy, NavigationQuery,
    NavigationResult, Navigator, ZoneMetrics,
};
use crate::storage::GraphStore;

/// Cloneable async handle to a [`Navigator`].
#[derive(Clone)]
pub struct NavigationService {
    navigator: Navigator,
}

impl NavigationService {
    pub fn new(store: Arc<dyn GraphStore>, policy: Arc<NavigationPolicy>) -> Self {
        Self {
            navigator: Navigator::new(store, policy),
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Navigate from `seed`, towards `goal` if given.
    pub async fn navigate(
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
        self.execute(query).await
    }

    /// Run a prepared query.
    pub async fn execute(&self, query: NavigationQuery) -> NavResult<NavigationResult> {
        self.run(move |nav| nav.execute(&query)).await
    }

    pub async fn detect_zone(&self, reference: &str) -> NavResult<CognitiveZone> {
        let reference = reference.to_string();
        self.run(move |nav| nav.detect_zone(&reference)).await
    }

    pub async fn compute_zone_metrics(&self, reference: &str) -> NavResult<ZoneMetrics> {
        let reference = reference.to_string();
        self.run(move |nav| nav.compute_zone_metrics(&reference)).await
    }

    async fn run<T, F>(&self, work: F) -> NavResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Navigator) -> NavResult<T> + Send + 'static,
    {
        let budget_ms = self.navigator.policy().search.timeout_ms;
        let navigator = self.navigator.clone();
        let task = tokio::task::spawn_blocking(move || work(&navigator));

        match tokio::time::timeout(Duration::from_millis(budget_ms), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(NavigationError::Task(e.to_string())),
            Err(_) => {
                tracing::warn!(budget_ms, "navigation abandoned after exceeding its budget");
                Err(NavigationError::TimeoutExceeded { budget_ms })
            }
        }
    }
}
