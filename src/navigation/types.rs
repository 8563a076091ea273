//! Navigation types and result structures

use crate::graph::{CoverageSource, EdgeId, Entity, EntityId, GraphVersion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Coarse trust classification of a single entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CognitiveZone {
    /// Corroborated by several provenance channels
    Core,
    /// Partially corroborated
    Edge,
    /// Thin or single-channel evidence
    NearBlind,
}

impl CognitiveZone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Edge => "EDGE",
            Self::NearBlind => "NEAR_BLIND",
        }
    }

    /// Human-readable description for result headers
    pub fn description(&self) -> &'static str {
        match self {
            Self::Core => "Core territory: corroborated by multiple provenance channels",
            Self::Edge => "Edge territory: partially corroborated, verify before relying on it",
            Self::NearBlind => "Near a blind spot: evidence is thin or comes from a single channel",
        }
    }
}

impl std::fmt::Display for CognitiveZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entity evidence snapshot. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMetrics {
    pub entity_id: EntityId,
    /// Total evidence on incident evidence-backed edges
    pub evidence_count: u64,
    /// Distinct channels observed / channel universe, rounded to 2 decimals
    pub coverage_ratio: f64,
    /// The channels observed
    pub coverage_sources: BTreeSet<CoverageSource>,
    pub evidence_density: f64,
    pub centrality: f64,
    pub zone_score: f64,
    pub blind_spot: bool,
    pub blind_spot_severity: f64,
}

/// Named path categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PathType {
    /// Cheapest route with no blind-spot entities
    Safe,
    /// Route most likely to surface new provenance channels
    Informative,
    /// Route avoiding the NEAR_BLIND zone entirely
    Conservative,
}

impl PathType {
    /// Presentation order
    pub const ALL: [PathType; 3] = [PathType::Safe, PathType::Informative, PathType::Conservative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Informative => "INFORMATIVE",
            Self::Conservative => "CONSERVATIVE",
        }
    }
}

impl std::fmt::Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an entity as reported in results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: EntityId,
    pub entity_type: String,
    pub name: String,
}

impl From<&Entity> for EntitySummary {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            entity_type: entity.entity_type.clone(),
            name: entity.name.clone(),
        }
    }
}

/// One hop of a candidate path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub entity: EntitySummary,
    /// Edge used to reach this entity (None for the seed)
    pub edge_id: Option<EdgeId>,
    pub relationship: Option<String>,
    /// Evidence on that edge (None for the seed)
    pub evidence_count: Option<u32>,
    pub zone: CognitiveZone,
    pub blind_spot: bool,
}

/// A classified, scored route starting at the seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub path_type: PathType,
    pub nodes: Vec<PathNode>,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub total_hops: usize,
    pub total_evidence: u64,
    pub coverage_sources: BTreeSet<CoverageSource>,
    pub blind_spot_count: usize,
    pub reason: String,
}

impl Path {
    /// The entity the path ends at
    pub fn destination(&self) -> Option<&EntityId> {
        self.nodes.last().map(|n| &n.entity.id)
    }

    /// Entity ids along the path, seed first
    pub fn entity_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.entity.id.as_str()).collect()
    }
}

/// Answer to a navigation query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationResult {
    pub seed: EntitySummary,
    pub goal: Option<EntitySummary>,
    pub current_zone: CognitiveZone,
    pub zone_description: String,
    pub paths: Vec<Path>,
    /// Set when `paths` is empty
    pub no_path_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub graph_version: GraphVersion,
}

/// Why a query produced no path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPathReason {
    /// The seed has no evidence-backed edges at all
    NoEvidenceEdges,
    /// The goal is not reachable within `max_hops` over evidence-backed edges
    GoalUnreachable { max_hops: usize },
    /// Candidates exist but none qualifies for any category
    FilteredByRiskPolicy { candidates: usize },
    /// The goal is the seed itself
    AlreadyAtGoal,
}

impl std::fmt::Display for NoPathReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEvidenceEdges => write!(f, "no evidence-backed edges from seed"),
            Self::GoalUnreachable { max_hops } => {
                write!(f, "goal unreachable within {} hops over evidence-backed edges", max_hops)
            }
            Self::FilteredByRiskPolicy { candidates } => write!(
                f,
                "all {} candidate paths filtered by risk policy",
                candidates
            ),
            Self::AlreadyAtGoal => write!(f, "goal is the seed entity; no traversal needed"),
        }
    }
}
