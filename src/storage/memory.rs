//! In-memory copy-on-write graph store

use super::traits::{GraphStore, StorageError, StorageResult};
use crate::graph::{
    Entity, EntityId, EvidenceEdge, GraphDocument, GraphSnapshot, GraphVersion, SnapshotBuilder,
};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// In-memory graph store.
///
/// Readers clone the current `Arc<GraphSnapshot>`; writers build a new
/// snapshot at the next version and swap it in. A snapshot handed out
/// to a query is never mutated afterwards.
#[derive(Debug)]
pub struct InMemoryStore {
    current: RwLock<Arc<GraphSnapshot>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store at version 0
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(GraphSnapshot::empty())),
        }
    }

    /// Create a store holding the given graph at version 1
    pub fn from_document(document: GraphDocument) -> StorageResult<Self> {
        let store = Self::new();
        store.load_document(document)?;
        Ok(store)
    }

    /// Insert or replace an entity
    pub fn upsert_entity(&self, entity: Entity) -> StorageResult<GraphVersion> {
        self.write(vec![entity], Vec::new())
    }

    /// Insert or replace an edge. Both endpoints must already exist.
    pub fn upsert_edge(&self, edge: EvidenceEdge) -> StorageResult<GraphVersion> {
        self.write(Vec::new(), vec![edge])
    }

    /// Merge a whole document into the graph as one version bump
    pub fn load_document(&self, document: GraphDocument) -> StorageResult<GraphVersion> {
        self.write(document.entities, document.edges)
    }

    /// Publish a new snapshot containing the current graph plus the
    /// given entities and edges. Writes are O(graph size).
    fn write(
        &self,
        entities: Vec<Entity>,
        edges: Vec<EvidenceEdge>,
    ) -> StorageResult<GraphVersion> {
        let mut current = self.current.write().map_err(|_| StorageError::LockPoisoned)?;

        let incoming: HashSet<&EntityId> = entities.iter().map(|e| &e.id).collect();
        for edge in &edges {
            for end in [&edge.source, &edge.target] {
                if !current.contains(end) && !incoming.contains(end) {
                    return Err(StorageError::EntityNotFound(end.to_string()));
                }
            }
        }

        let version = current.version().next();
        let mut builder = SnapshotBuilder::new(version);
        let existing = current.to_document();
        for entity in existing.entities.into_iter().chain(entities) {
            builder.add_entity(entity);
        }
        for edge in existing.edges.into_iter().chain(edges) {
            builder.add_edge(edge);
        }

        *current = Arc::new(builder.build());
        tracing::debug!(%version, "published graph snapshot");
        Ok(version)
    }
}

impl GraphStore for InMemoryStore {
    fn snapshot(&self) -> StorageResult<Arc<GraphSnapshot>> {
        let current = self.current.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(Arc::clone(&current))
    }

    fn version(&self) -> StorageResult<GraphVersion> {
        let current = self.current.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(current.version())
    }
}
