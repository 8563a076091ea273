//! Evidence-aware navigation
//!
//! Answers "where am I, and which next steps are backed by evidence" for an
//! entity in the graph. The pipeline for one query:
//!
//! 1. resolve seed and goal against a pinned [`GraphSnapshot`](crate::graph::GraphSnapshot)
//! 2. classify the seed's [`CognitiveZone`]
//! 3. search evidence-weighted routes ([`PathSearch`])
//! 4. select one route per [`PathType`] and score it ([`categorize_paths`])
//!
//! No returned [`Path`] ever crosses a zero-evidence edge, and every one
//! carries its confidence, risk level and coverage sources.

mod classify;
mod deadline;
mod error;
mod navigator;
pub mod policy;
mod risk;
mod search;
mod types;
mod zone;

pub use classify::{categorize_paths, coverage_diversity, Selection};
pub use deadline::Deadline;
pub use error::{NavResult, NavigationError};
pub use navigator::{NavigationQuery, Navigator};
pub use policy::{
    NavigationPolicy, PolicyError, ScoringPolicy, SearchPolicy, WeightPolicy, ZonePolicy,
    ZoneWeights,
};
pub use risk::{confidence, risk_level, validate_path};
pub use search::{Candidate, PathSearch};
pub use types::{
    CognitiveZone, EntitySummary, NavigationResult, NoPathReason, Path, PathNode, PathType,
    RiskLevel, ZoneMetrics,
};
pub use zone::{classify, ZoneEvaluator};
