//! Storage trait definitions

use crate::graph::{GraphSnapshot, GraphVersion};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Read contract of a graph store.
///
/// Entity lookup, reference resolution and incident-edge enumeration all
/// happen on the returned snapshot, so a caller that holds one snapshot
/// for the duration of a query never observes two graph versions.
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent access from multiple threads.
pub trait GraphStore: Send + Sync {
    /// A consistent view of the graph at its current version
    fn snapshot(&self) -> StorageResult<Arc<GraphSnapshot>>;

    /// The current graph version marker
    fn version(&self) -> StorageResult<GraphVersion>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: GraphStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
