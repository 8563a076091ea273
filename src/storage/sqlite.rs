//! SQLite storage backend for wayfinder

use super::traits::{GraphStore, OpenStore, StorageError, StorageResult};
use crate::graph::{
    CoverageSource, Entity, EntityId, EvidenceEdge, GraphDocument, GraphSnapshot, GraphVersion,
    SnapshotBuilder,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

const VERSION_KEY: &str = "graph_version";

/// SQLite-backed graph store
///
/// Uses a single SQLite database file with tables for entities, edges and
/// a version counter. Every write bumps the version in the same
/// transaction. Snapshots are read inside one transaction and cached until
/// the stored version moves on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    cached: Mutex<Option<Arc<GraphSnapshot>>>,
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL,
                name TEXT NOT NULL,
                external_ref TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_entities_external_ref
                ON entities(external_ref);

            CREATE TABLE IF NOT EXISTS edges (
                id TEXT PRIMARY KEY,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                relationship TEXT NOT NULL,
                evidence_count INTEGER NOT NULL,
                coverage_json TEXT NOT NULL,
                FOREIGN KEY (source_id) REFERENCES entities(id) ON DELETE CASCADE,
                FOREIGN KEY (target_id) REFERENCES entities(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id);
            CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);

            CREATE TABLE IF NOT EXISTS graph_meta (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );
            "#,
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO graph_meta (key, value) VALUES (?1, 0)",
            params![VERSION_KEY],
        )?;
        Ok(())
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            cached: Mutex::new(None),
        })
    }

    /// Insert or replace an entity
    pub fn save_entity(&self, entity: &Entity) -> StorageResult<GraphVersion> {
        self.write(|tx| Self::insert_entity(tx, entity))
    }

    /// Insert or replace an edge. Both endpoints must already exist.
    pub fn save_edge(&self, edge: &EvidenceEdge) -> StorageResult<GraphVersion> {
        self.write(|tx| Self::insert_edge(tx, edge))
    }

    /// Import a whole document as a single version bump
    pub fn import_document(&self, document: &GraphDocument) -> StorageResult<GraphVersion> {
        self.write(|tx| {
            for entity in &document.entities {
                Self::insert_entity(tx, entity)?;
            }
            for edge in &document.edges {
                Self::insert_edge(tx, edge)?;
            }
            Ok(())
        })
    }

    fn write(
        &self,
        apply: impl FnOnce(&Transaction<'_>) -> StorageResult<()>,
    ) -> StorageResult<GraphVersion> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let tx = conn.transaction()?;
        apply(&tx)?;
        tx.execute(
            "UPDATE graph_meta SET value = value + 1 WHERE key = ?1",
            params![VERSION_KEY],
        )?;
        let version = Self::read_version(&tx)?;
        tx.commit()?;
        tracing::debug!(%version, "committed graph write");
        Ok(version)
    }

    fn insert_entity(tx: &Transaction<'_>, entity: &Entity) -> StorageResult<()> {
        tx.execute(
            "INSERT INTO entities (id, entity_type, name, external_ref)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                entity_type = excluded.entity_type,
                name = excluded.name,
                external_ref = excluded.external_ref",
            params![
                entity.id.as_str(),
                entity.entity_type,
                entity.name,
                entity.external_ref
            ],
        )?;
        Ok(())
    }

    fn insert_edge(tx: &Transaction<'_>, edge: &EvidenceEdge) -> StorageResult<()> {
        for end in [&edge.source, &edge.target] {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM entities WHERE id = ?1",
                    params![end.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StorageError::EntityNotFound(end.to_string()));
            }
        }
        let coverage: Vec<&str> = edge.coverage_sources.iter().map(|s| s.as_str()).collect();
        tx.execute(
            "INSERT INTO edges (id, source_id, target_id, relationship, evidence_count, coverage_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                source_id = excluded.source_id,
                target_id = excluded.target_id,
                relationship = excluded.relationship,
                evidence_count = excluded.evidence_count,
                coverage_json = excluded.coverage_json",
            params![
                edge.id.as_str(),
                edge.source.as_str(),
                edge.target.as_str(),
                edge.relationship,
                edge.evidence_count as i64,
                serde_json::to_string(&coverage)?
            ],
        )?;
        Ok(())
    }

    fn read_version(conn: &Connection) -> StorageResult<GraphVersion> {
        let value: i64 = conn.query_row(
            "SELECT value FROM graph_meta WHERE key = ?1",
            params![VERSION_KEY],
            |row| row.get(0),
        )?;
        Ok(GraphVersion::new(value.max(0) as u64))
    }

    fn load_snapshot(conn: &Connection, version: GraphVersion) -> StorageResult<GraphSnapshot> {
        let mut builder = SnapshotBuilder::new(version);

        let mut stmt =
            conn.prepare("SELECT id, entity_type, name, external_ref FROM entities")?;
        let rows = stmt.query_map([], |row| {
            Ok(Entity {
                id: EntityId::from_string(row.get::<_, String>(0)?),
                entity_type: row.get(1)?,
                name: row.get(2)?,
                external_ref: row.get(3)?,
            })
        })?;
        for entity in rows {
            builder.add_entity(entity?);
        }

        let mut stmt = conn.prepare(
            "SELECT id, source_id, target_id, relationship, evidence_count, coverage_json FROM edges",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        for row in rows {
            let (id, source, target, relationship, evidence_count, coverage_json) = row?;
            builder.add_edge(Self::row_to_edge(
                id,
                source,
                target,
                relationship,
                evidence_count,
                &coverage_json,
            )?);
        }

        Ok(builder.build())
    }

    fn row_to_edge(
        id: String,
        source: String,
        target: String,
        relationship: String,
        evidence_count: i64,
        coverage_json: &str,
    ) -> StorageResult<EvidenceEdge> {
        let names: Vec<String> = serde_json::from_str(coverage_json)?;
        let coverage_sources = names
            .iter()
            .map(|n| n.parse::<CoverageSource>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(StorageError::Corrupt)?;
        let evidence_count = u32::try_from(evidence_count)
            .map_err(|_| StorageError::Corrupt(format!("edge {} has evidence {}", id, evidence_count)))?;

        Ok(EvidenceEdge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relationship,
            evidence_count,
            coverage_sources,
        })
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }
}

impl GraphStore for SqliteStore {
    fn snapshot(&self) -> StorageResult<Arc<GraphSnapshot>> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let version = Self::read_version(&tx)?;

        let mut cached = self.cached.lock().map_err(|_| StorageError::LockPoisoned)?;
        if let Some(snapshot) = cached.as_ref().filter(|s| s.version() == version) {
            return Ok(Arc::clone(snapshot));
        }

        let snapshot = Arc::new(Self::load_snapshot(&tx, version)?);
        tx.commit()?;
        tracing::debug!(
            %version,
            entities = snapshot.entity_count(),
            edges = snapshot.edge_count(),
            "loaded graph snapshot"
        );
        *cached = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn version(&self) -> StorageResult<GraphVersion> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        Self::read_version(&conn)
    }
}
