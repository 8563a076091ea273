//! Seeded random evidence graphs for property-style tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wayfinder::{CoverageSource, Entity, EvidenceEdge, GraphDocument};

#[derive(Debug, Clone)]
pub struct RandomGraphConfig {
    pub entities: usize,
    pub edges: usize,
    /// Evidence counts are drawn from `0..=max_evidence`
    pub max_evidence: u32,
    /// Probability that each coverage source is attached to an edge
    pub source_probability: f64,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            entities: 40,
            edges: 90,
            max_evidence: 6,
            source_probability: 0.4,
        }
    }
}

/// Deterministic random graph for `seed`. Includes zero-evidence edges,
/// parallel edges and edges with no coverage at all.
pub fn random_document(seed: u64, config: &RandomGraphConfig) -> GraphDocument {
    let mut rng = StdRng::seed_from_u64(seed);
    let entities: Vec<Entity> = (0..config.entities)
        .map(|i| Entity::new(format!("e{:03}", i), "module", format!("entity {}", i)))
        .collect();

    let mut edges = Vec::with_capacity(config.edges);
    for i in 0..config.edges {
        let a = rng.gen_range(0..config.entities);
        let mut b = rng.gen_range(0..config.entities);
        if b == a {
            b = (a + 1) % config.entities;
        }
        let mut edge = EvidenceEdge::new(
            format!("r{:04}", i),
            entities[a].id.clone(),
            entities[b].id.clone(),
            "related_to",
        )
        .with_evidence(rng.gen_range(0..=config.max_evidence));
        for source in CoverageSource::ALL {
            if rng.gen_bool(config.source_probability) {
                edge = edge.with_source(source);
            }
        }
        edges.push(edge);
    }

    GraphDocument { entities, edges }
}
