//! Wayfinder: Evidence-Aware Navigation for Knowledge Graphs
//!
//! Given a knowledge graph whose edges carry provenance evidence, Wayfinder
//! answers "where am I, and which next steps are trustworthy" without ever
//! presenting a route that outruns the evidence behind it.
//!
//! # Core Concepts
//!
//! - **Evidence edges**: relationships with an `evidence_count` and the
//!   provenance channels (version control, documentation, static analysis)
//!   that corroborate them. Zero-evidence edges are never traversed.
//! - **Zones**: every entity is CORE, EDGE or NEAR_BLIND depending on how
//!   well-corroborated its neighborhood is.
//! - **Paths**: up to three categorized routes (SAFE, INFORMATIVE,
//!   CONSERVATIVE), each with a confidence, a risk level and its coverage
//!   sources.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wayfinder::{CoverageSource, Entity, EvidenceEdge, InMemoryStore, NavigationPolicy, Navigator};
//!
//! let store = InMemoryStore::new();
//! store.upsert_entity(Entity::new("a", "module", "a")).unwrap();
//! store.upsert_entity(Entity::new("b", "module", "b")).unwrap();
//! store
//!     .upsert_edge(
//!         EvidenceEdge::new("ab", "a", "b", "imports")
//!             .with_evidence(3)
//!             .with_source(CoverageSource::StaticAnalysis)
//!             .with_source(CoverageSource::Documentation),
//!     )
//!     .unwrap();
//!
//! let navigator = Navigator::new(Arc::new(store), NavigationPolicy::default());
//! let result = navigator.navigate("a", Some("b"), 3, 3).unwrap();
//! assert!(!result.paths.is_empty());
//! assert!(result.paths.iter().all(|p| p.total_hops == 1));
//! ```

pub mod api;
pub mod graph;
pub mod navigation;
pub mod storage;

pub use api::NavigationService;
pub use graph::{
    CoverageSource, EdgeId, Entity, EntityId, EvidenceEdge, GraphDocument, GraphSnapshot,
    GraphVersion,
};
pub use navigation::{
    CognitiveZone, NavResult, NavigationError, NavigationPolicy, NavigationQuery,
    NavigationResult, Navigator, Path, PathNode, PathType, RiskLevel, ZoneMetrics,
};
pub use storage::{GraphStore, InMemoryStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
