//! Cooperative latency budget for a single query

use super::error::{NavResult, NavigationError};
use std::time::{Duration, Instant};

/// Wall-clock budget checked between search steps.
///
/// Exceeding it fails the whole query; partial paths are never returned.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// A deadline that never expires
    pub fn unbounded() -> Self {
        Self::after(Duration::MAX)
    }

    pub fn is_expired(&self) -> bool {
        self.started.elapsed() > self.budget
    }

    pub fn check(&self) -> NavResult<()> {
        if self.is_expired() {
            return Err(NavigationError::TimeoutExceeded {
                budget_ms: self.budget.as_millis().min(u64::MAX as u128) as u64,
            });
        }
        Ok(())
    }
}
