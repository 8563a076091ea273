//! Common test utilities for navigation integration tests
//!
//! Hand-built scenario graphs, a seeded random evidence-graph generator,
//! and the red-line checks every returned path must pass.

#![allow(dead_code)]

pub mod fixtures;
pub mod random;

pub use fixtures::{
    blind_hub_scenario, five_route_scenario, near_blind_hub_scenario, unreachable_scenario,
    zero_evidence_scenario,
};
pub use random::{random_document, RandomGraphConfig};

use std::collections::HashMap;
use std::sync::Arc;
use wayfinder::{
    EvidenceEdge, GraphDocument, InMemoryStore, NavigationPolicy, NavigationResult, Navigator,
    RiskLevel,
};

/// Navigator over an in-memory copy of `document` with the default policy
pub fn navigator_for(document: &GraphDocument) -> Navigator {
    let store = InMemoryStore::from_document(document.clone()).expect("fixture must load");
    Navigator::new(Arc::new(store), NavigationPolicy::default())
}

/// Assert that no returned path outruns its evidence or hides its risk.
pub fn assert_red_lines(document: &GraphDocument, result: &NavigationResult, max_hops: usize, max_paths: usize) {
    let edges: HashMap<&str, &EvidenceEdge> =
        document.edges.iter().map(|e| (e.id.as_str(), e)).collect();

    assert!(result.paths.len() <= max_paths, "more paths than max_paths");
    if result.paths.is_empty() {
        assert!(result.no_path_reason.is_some(), "empty result without a reason");
    }

    for path in &result.paths {
        assert_eq!(path.nodes[0].entity.id, result.seed.id, "path must start at the seed");
        assert!(path.total_hops >= 1 && path.total_hops <= max_hops);
        assert_eq!(path.nodes.len(), path.total_hops + 1);

        // no teleportation
        let mut union = std::collections::BTreeSet::new();
        let mut evidence = 0u64;
        for pair in path.nodes.windows(2) {
            let (from, to) = (&pair[0].entity.id, &pair[1].entity.id);
            let edge_id = to_edge_id(pair[1].edge_id.as_ref());
            let edge = edges
                .get(edge_id.as_str())
                .unwrap_or_else(|| panic!("hop {} -> {} uses unknown edge {}", from, to, edge_id));
            let joins = (&edge.source == from && &edge.target == to)
                || (&edge.source == to && &edge.target == from);
            assert!(joins, "edge {} does not join {} and {}", edge_id, from, to);
            assert!(edge.evidence_count >= 1, "hop {} -> {} has no evidence", from, to);
            assert_eq!(pair[1].evidence_count, Some(edge.evidence_count));
            union.extend(edge.coverage_sources.iter().copied());
            evidence += u64::from(edge.evidence_count);
        }

        // no risk hiding
        assert!((0.0..=1.0).contains(&path.confidence), "confidence {}", path.confidence);
        assert!(matches!(
            path.risk_level,
            RiskLevel::Low | RiskLevel::Medium | RiskLevel::High
        ));
        assert_eq!(path.coverage_sources, union);
        assert_eq!(path.total_evidence, evidence);
        if path.blind_spot_count > 0 {
            assert!(path.confidence <= 0.7);
        }
    }

    let json = serde_json::to_value(result).expect("result serializes");
    for path in json["paths"].as_array().into_iter().flatten() {
        for field in ["confidence", "risk_level", "coverage_sources"] {
            assert!(path.get(field).is_some(), "serialized path lacks {}", field);
        }
    }
}

fn to_edge_id(id: Option<&wayfinder::EdgeId>) -> String {
    id.map(|e| e.as_str().to_string())
        .expect("every hop after the seed records its edge")
}
