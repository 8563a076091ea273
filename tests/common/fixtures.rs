//! Hand-built scenario graphs

use wayfinder::{CoverageSource, Entity, EvidenceEdge, GraphDocument};
use CoverageSource::*;

const ALL: [CoverageSource; 3] = CoverageSource::ALL;

fn entity(id: &str) -> Entity {
    Entity::new(id, "module", id).with_external_ref(format!("src/{}.rs", id))
}

fn edge(a: &str, b: &str, evidence: u32, sources: &[CoverageSource]) -> EvidenceEdge {
    sources.iter().fold(
        EvidenceEdge::new(format!("{}-{}", a, b), a, b, "imports").with_evidence(evidence),
        |e, s| e.with_source(*s),
    )
}

fn document(ids: &[&str], edges: Vec<EvidenceEdge>) -> GraphDocument {
    GraphDocument {
        entities: ids.iter().map(|id| entity(id)).collect(),
        edges,
    }
}

/// Two routes from A to G.
///
/// Route 1 (A-B-G) is short and heavily evidenced, but B is only ever seen
/// through static analysis, so it sits in NEAR_BLIND territory. Its density
/// keeps it from being a blind spot. Route 2 (A-C-D-G) is longer and weaker
/// but runs through CORE entities only.
pub fn near_blind_hub_scenario() -> GraphDocument {
    document(
        &["A", "B", "C", "D", "G"],
        vec![
            edge("A", "B", 10, &[StaticAnalysis]),
            edge("B", "G", 10, &[StaticAnalysis]),
            edge("A", "C", 3, &ALL),
            edge("C", "D", 3, &ALL),
            edge("D", "G", 3, &ALL),
        ],
    )
}

/// Same shape as [`near_blind_hub_scenario`], but B carries so little
/// evidence that it is a blind spot as well.
pub fn blind_hub_scenario() -> GraphDocument {
    document(
        &["A", "B", "C", "D", "G"],
        vec![
            edge("A", "B", 1, &[StaticAnalysis]),
            edge("B", "G", 1, &[StaticAnalysis]),
            edge("A", "C", 3, &ALL),
            edge("C", "D", 3, &ALL),
            edge("D", "G", 3, &ALL),
        ],
    )
}

/// Five two-hop routes from S to G, one through each of x1..x5.
///
/// S itself is only seen through static analysis, so a route picking up
/// documentation and version-control evidence is informative.
pub fn five_route_scenario() -> GraphDocument {
    document(
        &["S", "x1", "x2", "x3", "x4", "x5", "G"],
        vec![
            // single channel, dense: NEAR_BLIND but not a blind spot
            edge("S", "x1", 8, &[StaticAnalysis]),
            edge("x1", "G", 8, &[StaticAnalysis]),
            // picks up two new channels
            edge("S", "x2", 4, &[StaticAnalysis]),
            edge("x2", "G", 4, &[Documentation, VersionControl]),
            // single channel, sparse: blind spot
            edge("S", "x3", 2, &[StaticAnalysis]),
            edge("x3", "G", 2, &[StaticAnalysis]),
            edge("S", "x4", 3, &[StaticAnalysis]),
            edge("x4", "G", 3, &[Documentation]),
            edge("S", "x5", 2, &[StaticAnalysis]),
            edge("x5", "G", 2, &[VersionControl]),
        ],
    )
}

/// A-B-C-D-E-Z chain: Z is five hops from A
pub fn unreachable_scenario() -> GraphDocument {
    document(
        &["A", "B", "C", "D", "E", "Z"],
        vec![
            edge("A", "B", 4, &ALL),
            edge("B", "C", 4, &ALL),
            edge("C", "D", 4, &ALL),
            edge("D", "E", 4, &ALL),
            edge("E", "Z", 4, &ALL),
        ],
    )
}

/// A and B are adjacent only through a zero-evidence edge; the evidenced
/// detour runs through C.
pub fn zero_evidence_scenario() -> GraphDocument {
    document(
        &["A", "B", "C"],
        vec![
            edge("A", "B", 0, &ALL),
            edge("A", "C", 5, &ALL),
            edge("C", "B", 5, &ALL),
        ],
    )
}
