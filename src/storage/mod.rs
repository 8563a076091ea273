//! Storage backends for wayfinder
//!
//! The navigation engine reads the graph through the `GraphStore` trait.
//! `InMemoryStore` serves embedded use and tests; `SqliteStore` is the
//! persistent backend used by the CLI.

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{GraphStore, OpenStore, StorageError, StorageResult};
