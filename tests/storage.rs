//! Navigation against persistent and concurrently-updated stores
//!
//! Run with: `cargo test --test storage`

mod common;

use common::{assert_red_lines, five_route_scenario, navigator_for, random_document, RandomGraphConfig};
use std::sync::Arc;
use std::thread;
use wayfinder::{
    CoverageSource, Entity, EvidenceEdge, GraphStore, InMemoryStore, NavigationPolicy,
    NavigationService, Navigator, OpenStore, SqliteStore,
};

#[test]
fn test_sqlite_store_answers_like_memory_store() {
    let dir = tempfile::tempdir().unwrap();
    let doc = five_route_scenario();

    let sqlite = SqliteStore::open(dir.path().join("graph.db")).unwrap();
    sqlite.import_document(&doc).unwrap();
    let from_disk = Navigator::new(Arc::new(sqlite), NavigationPolicy::default());
    let from_memory = navigator_for(&doc);

    for (seed, goal) in [("S", Some("G")), ("S", Some("x3")), ("x4", None), ("G", Some("S"))] {
        let disk = from_disk.navigate(seed, goal, 3, 3).unwrap();
        let memory = from_memory.navigate(seed, goal, 3, 3).unwrap();
        assert_red_lines(&doc, &disk, 3, 3);
        assert_eq!(disk.paths, memory.paths, "{} -> {:?}", seed, goal);
        assert_eq!(disk.current_zone, memory.current_zone);
    }
}

#[test]
fn test_sqlite_graph_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");
    let doc = random_document(17, &RandomGraphConfig::default());

    let before = {
        let store = SqliteStore::open(&path).unwrap();
        store.import_document(&doc).unwrap();
        Navigator::new(Arc::new(store), NavigationPolicy::default())
            .navigate("e000", None, 3, 3)
            .unwrap()
    };

    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(reopened.version().unwrap(), before.graph_version);
    let after = Navigator::new(Arc::new(reopened), NavigationPolicy::default())
        .navigate("e000", None, 3, 3)
        .unwrap();
    assert_eq!(after.paths, before.paths);
}

#[test]
fn test_queries_see_one_snapshot_while_graph_changes() {
    let doc = random_document(99, &RandomGraphConfig::default());
    let store = Arc::new(InMemoryStore::from_document(doc.clone()).unwrap());
    let navigator = Navigator::new(store.clone(), NavigationPolicy::default());

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for i in 0..200 {
                let id = format!("late{:03}", i);
                store.upsert_entity(Entity::new(id.as_str(), "module", id.as_str())).unwrap();
                store
                    .upsert_edge(
                        EvidenceEdge::new(format!("late-edge{:03}", i), "e000", id.as_str(), "imports")
                            .with_evidence(1 + i % 4)
                            .with_source(CoverageSource::ALL[(i % 3) as usize]),
                    )
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let navigator = navigator.clone();
            thread::spawn(move || {
                let mut versions = Vec::new();
                for _ in 0..25 {
                    let result = navigator.navigate("e000", None, 2, 3).unwrap();
                    for path in &result.paths {
                        assert!((0.0..=1.0).contains(&path.confidence));
                        for node in &path.nodes[1..] {
                            assert!(node.evidence_count.unwrap_or(0) >= 1);
                        }
                    }
                    versions.push(result.graph_version);
                }
                versions
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        let versions = reader.join().unwrap();
        // each reader only ever sees the graph move forward
        assert!(versions.windows(2).all(|w| w[0] <= w[1]));
    }
    assert_eq!(store.snapshot().unwrap().entity_count(), doc.entities.len() + 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_service_over_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("graph.db")).unwrap();
    store.import_document(&five_route_scenario()).unwrap();

    let service = NavigationService::new(Arc::new(store), Arc::new(NavigationPolicy::default()));
    let mut tasks = tokio::task::JoinSet::new();
    for goal in ["G", "x1", "x2", "x3", "x4", "x5"] {
        let service = service.clone();
        tasks.spawn(async move { service.navigate("S", Some(goal), 3, 3).await });
    }
    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap().unwrap();
        assert!(result.paths.len() <= 3);
        assert!(result.paths.is_empty() == result.no_path_reason.is_some());
    }
}
