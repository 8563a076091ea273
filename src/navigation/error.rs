//! Navigation error taxonomy

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while answering a navigation query.
///
/// "No path" is not an error: it is a successful result carrying a
/// `no_path_reason`.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Reference '{reference}' is ambiguous: it matches {matches} entities")]
    AmbiguousReference { reference: String, matches: usize },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Navigation exceeded its {budget_ms}ms budget")]
    TimeoutExceeded { budget_ms: u64 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Navigation task failed: {0}")]
    Task(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for navigation operations
pub type NavResult<T> = Result<T, NavigationError>;
