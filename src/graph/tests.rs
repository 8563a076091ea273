//! Serialization tests with contract fixtures

use serde_json::{json, Value};

/// Contract fixture: Entity as exported by the graph store
fn contract_entity_fixture() -> Value {
    json!({
        "id": "file:src/navigator.rs",
        "entity_type": "file",
        "name": "navigator.rs",
        "external_ref": "src/navigator.rs"
    })
}

/// Contract fixture: Evidence edge as produced by the provenance pipeline
fn contract_edge_fixture() -> Value {
    json!({
        "id": "edge:navigator-imports-search",
        "source": "file:src/navigator.rs",
        "target": "file:src/search.rs",
        "relationship": "imports",
        "evidence_count": 4,
        "coverage_sources": ["static_analysis", "version_control"]
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::{
        CoverageSource, EdgeId, Entity, EntityId, EvidenceEdge, GraphDocument, GraphVersion,
    };

    #[test]
    fn entity_id_serializes_as_string() {
        let id = EntityId::from_string("symbol:Navigator");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"symbol:Navigator\"");
    }

    #[test]
    fn graph_version_serializes_as_number() {
        let json = serde_json::to_string(&GraphVersion::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn coverage_source_serializes_snake_case() {
        let json = serde_json::to_string(&CoverageSource::VersionControl).unwrap();
        assert_eq!(json, "\"version_control\"");

        let parsed: CoverageSource = "static_analysis".parse().unwrap();
        assert_eq!(parsed, CoverageSource::StaticAnalysis);
        assert!("telemetry".parse::<CoverageSource>().is_err());
    }

    #[test]
    fn entity_deserializes_from_contract() {
        let entity: Entity = serde_json::from_value(contract_entity_fixture()).unwrap();
        assert_eq!(entity.id.as_str(), "file:src/navigator.rs");
        assert_eq!(entity.external_ref.as_deref(), Some("src/navigator.rs"));
    }

    #[test]
    fn entity_without_external_ref_skips_field() {
        let entity = Entity::new("symbol:x", "function", "x");
        let json = serde_json::to_value(&entity).unwrap();
        assert!(json.get("external_ref").is_none());
    }

    #[test]
    fn edge_deserializes_from_contract() {
        let edge: EvidenceEdge = serde_json::from_value(contract_edge_fixture()).unwrap();
        assert_eq!(edge.id, EdgeId::from("edge:navigator-imports-search"));
        assert_eq!(edge.evidence_count, 4);
        assert!(edge.is_evidence_backed());
        assert!(edge.coverage_sources.contains(&CoverageSource::StaticAnalysis));
        assert!(edge.coverage_sources.contains(&CoverageSource::VersionControl));
    }

    #[test]
    fn edge_coverage_sources_default_to_empty() {
        let edge: EvidenceEdge = serde_json::from_value(json!({
            "id": "e",
            "source": "a",
            "target": "b",
            "relationship": "mentions",
            "evidence_count": 0
        }))
        .unwrap();
        assert!(edge.coverage_sources.is_empty());
        assert!(!edge.is_evidence_backed());
    }

    #[test]
    fn graph_document_accepts_missing_sections() {
        let doc: GraphDocument = serde_json::from_value(json!({
            "entities": [contract_entity_fixture()]
        }))
        .unwrap();
        assert_eq!(doc.entities.len(), 1);
        assert!(doc.edges.is_empty());
    }
}
