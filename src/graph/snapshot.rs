//! GraphSnapshot: an immutable, versioned view of the evidence graph
//!
//! Every navigation query reads from exactly one snapshot, so zone
//! metrics, the search, and re-checks during weighting all observe the
//! same graph version even while the store is being written to.

use super::edge::{EdgeId, EvidenceEdge};
use super::entity::{Entity, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Monotonically increasing graph version marker
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GraphVersion(u64);

impl GraphVersion {
    pub fn new(version: u64) -> Self {
        Self(version)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The version that follows this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for GraphVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Serializable form of a whole graph (JSON import/export)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub edges: Vec<EvidenceEdge>,
}

/// Why a reference could not be resolved to a single entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing matches the reference
    NotFound,
    /// The reference matches more than one entity
    Ambiguous(usize),
}

/// An evidence-backed neighbor reachable in one hop
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub entity: &'a EntityId,
    /// The strongest edge connecting the two entities
    pub edge: &'a EvidenceEdge,
}

/// Immutable view of entities and edges at one graph version
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    version: GraphVersion,
    entities: HashMap<EntityId, Entity>,
    /// All edges, ordered by id (zero-evidence edges included)
    edges: Vec<EvidenceEdge>,
    /// Entity -> indices of evidence-backed incident edges,
    /// ordered by (neighbor id, edge id)
    incident: HashMap<EntityId, Vec<usize>>,
    by_external_ref: HashMap<String, Vec<EntityId>>,
    by_name: HashMap<String, Vec<EntityId>>,
}

impl GraphSnapshot {
    /// Start building a snapshot at the given version
    pub fn builder(version: GraphVersion) -> SnapshotBuilder {
        SnapshotBuilder::new(version)
    }

    /// An empty graph at version 0
    pub fn empty() -> Self {
        SnapshotBuilder::new(GraphVersion::default()).build()
    }

    /// Build a snapshot from a graph document
    pub fn from_document(version: GraphVersion, document: GraphDocument) -> Self {
        let mut builder = SnapshotBuilder::new(version);
        for entity in document.entities {
            builder.add_entity(entity);
        }
        for edge in document.edges {
            builder.add_edge(edge);
        }
        builder.build()
    }

    /// Export the snapshot as a graph document (entities ordered by id)
    pub fn to_document(&self) -> GraphDocument {
        let mut entities: Vec<Entity> = self.entities.values().cloned().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        GraphDocument {
            entities,
            edges: self.edges.clone(),
        }
    }

    pub fn version(&self) -> GraphVersion {
        self.version
    }

    /// Get an entity by ID
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Check if an entity exists
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Get all entities
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Get all edges, including those without evidence
    pub fn edges(&self) -> impl Iterator<Item = &EvidenceEdge> {
        self.edges.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Evidence-backed edges incident to an entity, in either direction
    pub fn incident_edges<'a>(
        &'a self,
        id: &EntityId,
    ) -> impl Iterator<Item = &'a EvidenceEdge> + 'a {
        self.incident
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&idx| &self.edges[idx])
    }

    /// Distinct evidence-backed neighbors of an entity, ordered by id.
    ///
    /// Where parallel edges connect the same pair, the one with the most
    /// evidence is kept (ties go to the smaller edge id).
    pub fn neighbors(&self, id: &EntityId) -> Vec<Neighbor<'_>> {
        let mut out: Vec<Neighbor<'_>> = Vec::new();
        for edge in self.incident_edges(id) {
            let Some(other) = edge.other_end(id) else {
                continue;
            };
            match out.last_mut() {
                Some(last) if last.entity == other => {
                    if edge.evidence_count > last.edge.evidence_count {
                        last.edge = edge;
                    }
                }
                _ => out.push(Neighbor {
                    entity: other,
                    edge,
                }),
            }
        }
        out
    }

    /// Number of distinct evidence-backed neighbors
    pub fn degree(&self, id: &EntityId) -> usize {
        self.neighbors(id).len()
    }

    /// Resolve an identifier or external reference to an entity.
    ///
    /// Tries the exact entity id first, then `external_ref`, then the
    /// display name. A reference matching several entities is ambiguous.
    pub fn resolve(&self, reference: &str) -> Result<&Entity, ResolveError> {
        if let Some(entity) = self.entities.get(&EntityId::from(reference)) {
            return Ok(entity);
        }
        for index in [&self.by_external_ref, &self.by_name] {
            match index.get(reference).map(|ids| ids.as_slice()) {
                Some([only]) => {
                    return self.entities.get(only).ok_or(ResolveError::NotFound);
                }
                Some(ids) if ids.len() > 1 => return Err(ResolveError::Ambiguous(ids.len())),
                _ => {}
            }
        }
        Err(ResolveError::NotFound)
    }
}

/// Incremental builder for [`GraphSnapshot`]
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    version: GraphVersion,
    entities: HashMap<EntityId, Entity>,
    edges: BTreeMap<EdgeId, EvidenceEdge>,
}

impl SnapshotBuilder {
    pub fn new(version: GraphVersion) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    /// Insert or replace an entity
    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.insert(entity.id.clone(), entity);
        self
    }

    /// Insert or replace an edge (keyed by edge id)
    pub fn add_edge(&mut self, edge: EvidenceEdge) -> &mut Self {
        self.edges.insert(edge.id.clone(), edge);
        self
    }

    /// Builder-style variant of [`add_entity`](Self::add_entity)
    pub fn entity(mut self, entity: Entity) -> Self {
        self.add_entity(entity);
        self
    }

    /// Builder-style variant of [`add_edge`](Self::add_edge)
    pub fn edge(mut self, edge: EvidenceEdge) -> Self {
        self.add_edge(edge);
        self
    }

    /// Index the graph. Edges with an unknown endpoint are dropped.
    pub fn build(self) -> GraphSnapshot {
        let SnapshotBuilder {
            version,
            entities,
            edges,
        } = self;

        let edges: Vec<EvidenceEdge> = edges
            .into_values()
            .filter(|e| {
                let known = entities.contains_key(&e.source) && entities.contains_key(&e.target);
                if !known {
                    tracing::warn!(edge = %e.id, source = %e.source, target = %e.target, "dropping dangling edge");
                }
                known
            })
            .collect();

        let mut incident: HashMap<EntityId, Vec<usize>> = HashMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            if !edge.is_evidence_backed() || edge.source == edge.target {
                continue;
            }
            incident.entry(edge.source.clone()).or_default().push(idx);
            incident.entry(edge.target.clone()).or_default().push(idx);
        }
        for (id, list) in incident.iter_mut() {
            list.sort_by(|&a, &b| {
                let (ea, eb) = (&edges[a], &edges[b]);
                ea.other_end(id)
                    .cmp(&eb.other_end(id))
                    .then_with(|| ea.id.cmp(&eb.id))
            });
        }

        let mut by_external_ref: HashMap<String, Vec<EntityId>> = HashMap::new();
        let mut by_name: HashMap<String, Vec<EntityId>> = HashMap::new();
        for entity in entities.values() {
            if let Some(ext) = &entity.external_ref {
                by_external_ref
                    .entry(ext.clone())
                    .or_default()
                    .push(entity.id.clone());
            }
            by_name
                .entry(entity.name.clone())
                .or_default()
                .push(entity.id.clone());
        }

        GraphSnapshot {
            version,
            entities,
            edges,
            incident,
            by_external_ref,
            by_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CoverageSource;

    fn sample() -> GraphSnapshot {
        GraphSnapshot::builder(GraphVersion::new(7))
            .entity(Entity::new("a", "file", "alpha").with_external_ref("src/a.rs"))
            .entity(Entity::new("b", "file", "beta"))
            .entity(Entity::new("c", "file", "beta"))
            .edge(EvidenceEdge::new("e1", "a", "b", "imports").with_evidence(2))
            .edge(
                EvidenceEdge::new("e2", "b", "a", "documents")
                    .with_evidence(5)
                    .with_source(CoverageSource::Documentation),
            )
            .edge(EvidenceEdge::new("e3", "a", "c", "imports"))
            .edge(EvidenceEdge::new("e4", "a", "ghost", "imports").with_evidence(3))
            .build()
    }

    #[test]
    fn zero_evidence_edges_are_not_incident() {
        let snap = sample();
        let ids: Vec<&str> = snap
            .incident_edges(&EntityId::from("a"))
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["e1", "e2"]);
        assert!(snap.incident_edges(&EntityId::from("c")).next().is_none());
    }

    #[test]
    fn dangling_edges_are_dropped() {
        let snap = sample();
        assert_eq!(snap.edge_count(), 3);
        assert!(snap.edges().all(|e| e.id.as_str() != "e4"));
    }

    #[test]
    fn neighbors_keep_strongest_parallel_edge() {
        let snap = sample();
        let neighbors = snap.neighbors(&EntityId::from("a"));
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].entity.as_str(), "b");
        assert_eq!(neighbors[0].edge.id.as_str(), "e2");
        assert_eq!(snap.degree(&EntityId::from("b")), 1);
    }

    #[test]
    fn resolve_by_id_external_ref_and_name() {
        let snap = sample();
        assert_eq!(snap.resolve("a").unwrap().id.as_str(), "a");
        assert_eq!(snap.resolve("src/a.rs").unwrap().id.as_str(), "a");
        assert_eq!(snap.resolve("alpha").unwrap().id.as_str(), "a");
        assert_eq!(snap.resolve("beta").unwrap_err(), ResolveError::Ambiguous(2));
        assert_eq!(snap.resolve("nope").unwrap_err(), ResolveError::NotFound);
    }

    #[test]
    fn document_round_trip_preserves_version_independent_content() {
        let snap = sample();
        let doc = snap.to_document();
        let rebuilt = GraphSnapshot::from_document(GraphVersion::new(8), doc.clone());
        assert_eq!(rebuilt.to_document(), doc);
        assert_eq!(rebuilt.version().get(), 8);
    }
}
