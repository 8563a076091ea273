//! Core graph data structures

mod edge;
mod entity;
mod snapshot;

#[cfg(test)]
mod tests;

pub use edge::{CoverageSource, EdgeId, EvidenceEdge};
pub use entity::{Entity, EntityId};
pub use snapshot::{
    GraphDocument, GraphSnapshot, GraphVersion, Neighbor, ResolveError, SnapshotBuilder,
};
