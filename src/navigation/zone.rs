//! Zone metrics: how well-corroborated is the territory around an entity
//!
//! Everything here is a pure function of one graph snapshot. The evaluator
//! memoizes per query; nothing is kept across queries.

use super::error::{NavResult, NavigationError};
use super::policy::ZonePolicy;
use super::types::{CognitiveZone, ZoneMetrics};
use crate::graph::{CoverageSource, EntityId, GraphSnapshot};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

/// Computes [`ZoneMetrics`] and [`CognitiveZone`]s against one snapshot.
pub struct ZoneEvaluator<'a> {
    snapshot: &'a GraphSnapshot,
    policy: &'a ZonePolicy,
    memo: RefCell<HashMap<EntityId, ZoneMetrics>>,
}

impl<'a> ZoneEvaluator<'a> {
    pub fn new(snapshot: &'a GraphSnapshot, policy: &'a ZonePolicy) -> Self {
        Self {
            snapshot,
            policy,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn snapshot(&self) -> &'a GraphSnapshot {
        self.snapshot
    }

    /// Evidence metrics for one entity
    pub fn compute_zone_metrics(&self, id: &EntityId) -> NavResult<ZoneMetrics> {
        if let Some(metrics) = self.memo.borrow().get(id) {
            return Ok(metrics.clone());
        }
        if !self.snapshot.contains(id) {
            return Err(NavigationError::NotFound(id.to_string()));
        }

        let metrics = self.measure(id);
        self.memo.borrow_mut().insert(id.clone(), metrics.clone());
        Ok(metrics)
    }

    /// Zone classification for one entity
    pub fn detect_zone(&self, id: &EntityId) -> NavResult<CognitiveZone> {
        Ok(classify(&self.compute_zone_metrics(id)?, self.policy))
    }

    fn measure(&self, id: &EntityId) -> ZoneMetrics {
        let policy = self.policy;

        let mut sources: BTreeSet<CoverageSource> = BTreeSet::new();
        let mut evidence: u64 = 0;
        for edge in self.snapshot.incident_edges(id) {
            sources.extend(edge.coverage_sources.iter().copied());
            evidence += u64::from(edge.evidence_count);
        }

        let coverage_ratio = round2(sources.len() as f64 / CoverageSource::ALL.len() as f64);
        let evidence_density = saturate(evidence as f64, policy.density_half_saturation);
        let centrality = self.centrality(id);

        let blind_spot = sources.len() <= policy.blind_spot_max_channels
            && evidence_density < policy.blind_spot_max_density;
        let blind_spot_severity = if blind_spot {
            let coverage_gap = shortfall(coverage_ratio, policy.near_blind_max_coverage);
            let density_gap = shortfall(evidence_density, policy.blind_spot_max_density);
            (coverage_gap + density_gap) / 2.0
        } else {
            0.0
        };

        let w = &policy.weights;
        let zone_score = w.coverage * coverage_ratio
            + w.density * evidence_density
            + w.clarity * if blind_spot { 0.0 } else { 1.0 }
            + w.centrality * centrality;

        ZoneMetrics {
            entity_id: id.clone(),
            evidence_count: evidence,
            coverage_ratio,
            coverage_sources: sources,
            evidence_density,
            centrality,
            zone_score,
            blind_spot,
            blind_spot_severity,
        }
    }

    /// Degree relative to the mean degree of the entity's neighbors, capped at 1
    fn centrality(&self, id: &EntityId) -> f64 {
        let neighbors = self.snapshot.neighbors(id);
        if neighbors.is_empty() {
            return 0.0;
        }
        let neighbor_degrees: usize = neighbors
            .iter()
            .map(|n| self.snapshot.degree(n.entity))
            .sum();
        let mean = neighbor_degrees as f64 / neighbors.len() as f64;
        if mean <= 0.0 {
            return 0.0;
        }
        (neighbors.len() as f64 / mean).min(1.0)
    }
}

/// Classify metrics. First match wins: CORE, then NEAR_BLIND, else EDGE.
pub fn classify(metrics: &ZoneMetrics, policy: &ZonePolicy) -> CognitiveZone {
    if metrics.coverage_ratio >= policy.core_min_coverage
        && metrics.zone_score >= policy.core_min_score
        && !metrics.blind_spot
    {
        CognitiveZone::Core
    } else if metrics.coverage_ratio <= policy.near_blind_max_coverage
        || metrics.blind_spot_severity >= policy.near_blind_min_severity
    {
        CognitiveZone::NearBlind
    } else {
        CognitiveZone::Edge
    }
}

/// Diminishing-returns curve `x / (x + half)`: 0 at 0, 0.5 at `half`, -> 1.
fn saturate(x: f64, half: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    x / (x + half)
}

/// How far `value` falls below `threshold`, as a fraction of it, in [0, 1]
fn shortfall(value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return if value <= 0.0 { 1.0 } else { 0.0 };
    }
    ((threshold - value) / threshold).clamp(0.0, 1.0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Entity, EvidenceEdge, GraphVersion};
    use CoverageSource::*;

    fn graph() -> GraphSnapshot {
        // hub is observed through all three channels; leaf through one;
        // island has no evidence-backed edge at all
        GraphSnapshot::builder(GraphVersion::new(1))
            .entity(Entity::new("hub", "file", "hub"))
            .entity(Entity::new("peer", "file", "peer"))
            .entity(Entity::new("leaf", "file", "leaf"))
            .entity(Entity::new("island", "file", "island"))
            .edge(
                EvidenceEdge::new("hp", "hub", "peer", "imports")
                    .with_evidence(8)
                    .with_source(StaticAnalysis)
                    .with_source(VersionControl),
            )
            .edge(
                EvidenceEdge::new("hd", "peer", "hub", "documents")
                    .with_evidence(4)
                    .with_source(Documentation),
            )
            .edge(
                EvidenceEdge::new("hl", "hub", "leaf", "imports")
                    .with_evidence(1)
                    .with_source(StaticAnalysis),
            )
            .edge(EvidenceEdge::new("hi", "hub", "island", "mentions"))
            .build()
    }

    #[test]
    fn test_well_corroborated_entity_is_core() {
        let snap = graph();
        let policy = ZonePolicy::default();
        let eval = ZoneEvaluator::new(&snap, &policy);

        let m = eval.compute_zone_metrics(&EntityId::from("hub")).unwrap();
        assert_eq!(m.coverage_ratio, 1.0);
        assert_eq!(m.evidence_count, 13);
        assert!(!m.blind_spot);
        assert_eq!(m.blind_spot_severity, 0.0);
        assert_eq!(m.centrality, 1.0);
        assert!(m.zone_score >= 0.6);
        assert_eq!(eval.detect_zone(&EntityId::from("hub")).unwrap(), CognitiveZone::Core);
    }

    #[test]
    fn test_single_channel_low_evidence_entity_is_near_blind() {
        let snap = graph();
        let policy = ZonePolicy::default();
        let eval = ZoneEvaluator::new(&snap, &policy);

        let m = eval.compute_zone_metrics(&EntityId::from("leaf")).unwrap();
        assert_eq!(m.coverage_ratio, 0.33);
        assert!(m.blind_spot);
        assert!(m.blind_spot_severity > 0.0 && m.blind_spot_severity < 0.5);
        assert_eq!(eval.detect_zone(&EntityId::from("leaf")).unwrap(), CognitiveZone::NearBlind);
    }

    #[test]
    fn test_entity_without_evidence_is_maximally_blind() {
        let snap = graph();
        let policy = ZonePolicy::default();
        let eval = ZoneEvaluator::new(&snap, &policy);

        let m = eval.compute_zone_metrics(&EntityId::from("island")).unwrap();
        assert_eq!(m.evidence_count, 0);
        assert_eq!(m.coverage_ratio, 0.0);
        assert_eq!(m.centrality, 0.0);
        assert!(m.blind_spot);
        assert_eq!(m.blind_spot_severity, 1.0);
        assert!((m.zone_score - 0.0).abs() < 1e-12);
        assert_eq!(eval.detect_zone(&EntityId::from("island")).unwrap(), CognitiveZone::NearBlind);
    }

    #[test]
    fn test_two_channels_with_little_evidence_can_still_be_core() {
        let policy = ZonePolicy::default();
        let snap = GraphSnapshot::builder(GraphVersion::new(1))
            .entity(Entity::new("a", "file", "a"))
            .entity(Entity::new("b", "file", "b"))
            .edge(
                EvidenceEdge::new("ab", "a", "b", "imports")
                    .with_evidence(1)
                    .with_source(StaticAnalysis)
                    .with_source(Documentation),
            )
            .build();
        let eval = ZoneEvaluator::new(&snap, &policy);
        let m = eval.compute_zone_metrics(&EntityId::from("a")).unwrap();
        assert_eq!(m.coverage_ratio, 0.67);
        assert!(!m.blind_spot);
        // 0.4*0.67 + 0.3*(1/6) + 0.2 + 0.1*1.0 = 0.618
        assert!((m.zone_score - 0.618).abs() < 1e-9);
        assert_eq!(eval.detect_zone(&EntityId::from("a")).unwrap(), CognitiveZone::Core);
    }

    #[test]
    fn test_metrics_are_idempotent() {
        let snap = graph();
        let policy = ZonePolicy::default();
        let first = ZoneEvaluator::new(&snap, &policy)
            .compute_zone_metrics(&EntityId::from("peer"))
            .unwrap();
        let eval = ZoneEvaluator::new(&snap, &policy);
        let second = eval.compute_zone_metrics(&EntityId::from("peer")).unwrap();
        let memoized = eval.compute_zone_metrics(&EntityId::from("peer")).unwrap();
        assert_eq!(first, second);
        assert_eq!(second, memoized);
        assert_eq!(eval.detect_zone(&EntityId::from("peer")).unwrap(), CognitiveZone::Core);
    }

    #[test]
    fn test_unknown_entity_is_not_found() {
        let snap = graph();
        let policy = ZonePolicy::default();
        let eval = ZoneEvaluator::new(&snap, &policy);
        let err = eval.compute_zone_metrics(&EntityId::from("ghost")).unwrap_err();
        assert!(matches!(err, NavigationError::NotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_classification_precedence() {
        let policy = ZonePolicy::default();
        let base = ZoneMetrics {
            entity_id: EntityId::from("x"),
            evidence_count: 0,
            coverage_ratio: 0.5,
            coverage_sources: BTreeSet::new(),
            evidence_density: 0.5,
            centrality: 0.5,
            zone_score: 0.5,
            blind_spot: false,
            blind_spot_severity: 0.0,
        };
        assert_eq!(classify(&base, &policy), CognitiveZone::Edge);

        let severe = ZoneMetrics {
            blind_spot: true,
            blind_spot_severity: 0.6,
            ..base.clone()
        };
        assert_eq!(classify(&severe, &policy), CognitiveZone::NearBlind);

        let strong_but_blind = ZoneMetrics {
            coverage_ratio: 0.67,
            zone_score: 0.9,
            blind_spot: true,
            blind_spot_severity: 0.1,
            ..base.clone()
        };
        assert_eq!(classify(&strong_but_blind, &policy), CognitiveZone::Edge);
    }

    #[test]
    fn test_density_curve_is_monotonic_and_bounded() {
        let mut previous = -1.0;
        for e in [0.0, 1.0, 2.0, 5.0, 50.0, 5_000.0] {
            let d = saturate(e, 5.0);
            assert!((0.0..1.0).contains(&d));
            assert!(d > previous);
            previous = d;
        }
        assert_eq!(saturate(5.0, 5.0), 0.5);
    }
}
