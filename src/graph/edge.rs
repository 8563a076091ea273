//! Evidence edges: relationships backed by provenance observations

use super::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Create an EdgeId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A provenance channel that can corroborate an entity or edge.
///
/// The set is closed: `ALL` is the universe used as the denominator of
/// an entity's coverage ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageSource {
    /// Commit history, blame, co-change
    VersionControl,
    /// Design docs, READMEs, ADRs
    Documentation,
    /// Imports, calls, type references
    StaticAnalysis,
}

impl CoverageSource {
    /// Every channel in the provenance universe
    pub const ALL: [CoverageSource; 3] = [
        CoverageSource::VersionControl,
        CoverageSource::Documentation,
        CoverageSource::StaticAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VersionControl => "version_control",
            Self::Documentation => "documentation",
            Self::StaticAnalysis => "static_analysis",
        }
    }
}

impl std::str::FromStr for CoverageSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "version_control" => Ok(Self::VersionControl),
            "documentation" => Ok(Self::Documentation),
            "static_analysis" => Ok(Self::StaticAnalysis),
            _ => Err(format!("unknown coverage source: {}", s)),
        }
    }
}

impl std::fmt::Display for CoverageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relationship between two entities with the evidence supporting it.
///
/// Stored with a direction (`source` -> `target`) but navigated as
/// undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceEdge {
    /// Unique identifier
    pub id: EdgeId,
    /// Source entity
    pub source: EntityId,
    /// Target entity
    pub target: EntityId,
    /// Type of relationship (e.g. "imports", "documents", "co_changes_with")
    pub relationship: String,
    /// Number of independent observations supporting the edge
    pub evidence_count: u32,
    /// Provenance channels the observations came from
    #[serde(default)]
    pub coverage_sources: BTreeSet<CoverageSource>,
}

impl EvidenceEdge {
    /// Create a new edge with no evidence yet
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relationship: relationship.into(),
            evidence_count: 0,
            coverage_sources: BTreeSet::new(),
        }
    }

    /// Set the evidence count
    pub fn with_evidence(mut self, evidence_count: u32) -> Self {
        self.evidence_count = evidence_count;
        self
    }

    /// Add a corroborating provenance channel
    pub fn with_source(mut self, source: CoverageSource) -> Self {
        self.coverage_sources.insert(source);
        self
    }

    /// Whether the edge exists for navigation purposes
    pub fn is_evidence_backed(&self) -> bool {
        self.evidence_count >= 1
    }

    /// The endpoint opposite `from`, or None if `from` is not an endpoint
    pub fn other_end(&self, from: &EntityId) -> Option<&EntityId> {
        if &self.source == from {
            Some(&self.target)
        } else if &self.target == from {
            Some(&self.source)
        } else {
            None
        }
    }
}
