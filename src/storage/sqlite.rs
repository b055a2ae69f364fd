//! `SQLite` graph store for persistent relationship tracking.
//!
//! Provides node and edge storage using `SQLite` with atomic weight
//! accumulation via upserts and deterministic read ordering for traversal.

// Allow cast_possible_truncation and cast_sign_loss for SQLite i64 to usize conversions.
// SQLite returns i64, but node and edge counts are inherently non-negative and small.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Allow missing_const_for_fn - some methods are trait impls or take locks.
#![allow(clippy::missing_const_for_fn)]

use crate::models::{
    validate_identity, validate_weight_delta, Edge, Node, NodeHandle,
};
use crate::storage::traits::{GraphStats, GraphStore};
use crate::{current_timestamp, Error, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::instrument;

/// Helper to acquire mutex lock with poison recovery.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("graph SQLite mutex was poisoned, recovering");
            metrics::counter!("filegraph_sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Maps a rusqlite error into [`Error::OperationFailed`] for `operation`.
fn storage_err(operation: &str) -> impl Fn(rusqlite::Error) -> Error + '_ {
    move |e| Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}

/// Serializes an optional property bag to its JSON column value.
fn properties_to_json(
    operation: &str,
    properties: Option<&HashMap<String, String>>,
) -> Result<Option<String>> {
    properties
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::OperationFailed {
            operation: operation.to_string(),
            cause: e.to_string(),
        })
}

/// `SQLite`-based graph store.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` for thread-safe access. WAL mode and
/// `busy_timeout` handle concurrent access gracefully. The edge-weight
/// increment is a single `ON CONFLICT .. DO UPDATE` statement executed inside
/// a transaction together with endpoint vivification, so concurrent
/// observers of the same triple cannot lose an increment and a failed
/// observation leaves no partial state.
///
/// # Schema
///
/// Two tables store the relationship graph:
/// - `graph_nodes`: entities with a stable `handle` and a unique
///   `(entity_type, entity_id)` composite identity
/// - `graph_edges`: directed weighted edges keyed by
///   `(from_handle, to_handle, edge_type)`
///
/// `handle` is `INTEGER PRIMARY KEY AUTOINCREMENT`: row ids are never
/// reused, and `ensure_node` updates conflicting rows in place, so a handle
/// observed once stays valid for the lifetime of the database file.
pub struct SqliteGraphStore {
    /// Connection to the `SQLite` database.
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteGraphStore {
    /// Creates a new `SQLite` graph store backed by a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = Connection::open(&db_path).map_err(storage_err("open_graph_sqlite"))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };

        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory `SQLite` graph store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(storage_err("open_graph_sqlite_memory"))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };

        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Initializes the database schema.
    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        // Enable WAL mode for better concurrent read performance
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");
        let _ = conn.pragma_update(None, "busy_timeout", "5000");
        // Enable foreign keys for referential integrity
        let _ = conn.pragma_update(None, "foreign_keys", "ON");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS graph_nodes (
                handle INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                label TEXT,
                properties TEXT,
                created_at INTEGER NOT NULL,
                UNIQUE(entity_type, entity_id)
            )",
            [],
        )
        .map_err(storage_err("create_graph_nodes_table"))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS graph_edges (
                from_handle INTEGER NOT NULL,
                to_handle INTEGER NOT NULL,
                edge_type TEXT NOT NULL,
                weight REAL NOT NULL,
                properties TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (from_handle, to_handle, edge_type),
                FOREIGN KEY (from_handle) REFERENCES graph_nodes(handle),
                FOREIGN KEY (to_handle) REFERENCES graph_nodes(handle)
            )",
            [],
        )
        .map_err(storage_err("create_graph_edges_table"))?;

        Self::create_indexes(&conn);

        Ok(())
    }

    /// Creates indexes for optimized queries.
    fn create_indexes(conn: &Connection) {
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_graph_nodes_type ON graph_nodes(entity_type)",
            [],
        );
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_graph_edges_from ON graph_edges(from_handle)",
            [],
        );
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_graph_edges_to ON graph_edges(to_handle)",
            [],
        );
        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_graph_edges_type ON graph_edges(edge_type)",
            [],
        );
    }

    /// Parses a node from a database row.
    fn parse_node_row(row: &Row<'_>) -> rusqlite::Result<Node> {
        let handle: i64 = row.get("handle")?;
        let entity_type: String = row.get("entity_type")?;
        let entity_id: String = row.get("entity_id")?;
        let label: Option<String> = row.get("label")?;
        let properties_json: Option<String> = row.get("properties")?;
        let created_at: i64 = row.get("created_at")?;

        let properties: HashMap<String, String> = properties_json
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        Ok(Node {
            handle: NodeHandle::new(handle),
            entity_type,
            entity_id,
            label,
            properties,
            created_at,
        })
    }

    /// Parses an edge from a database row.
    fn parse_edge_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
        let from: i64 = row.get("from_handle")?;
        let to: i64 = row.get("to_handle")?;
        let edge_type: String = row.get("edge_type")?;
        let weight: f64 = row.get("weight")?;
        let properties_json: Option<String> = row.get("properties")?;
        let created_at: i64 = row.get("created_at")?;
        let updated_at: i64 = row.get("updated_at")?;

        let properties: HashMap<String, String> = properties_json
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        Ok(Edge {
            from: NodeHandle::new(from),
            to: NodeHandle::new(to),
            edge_type,
            weight,
            properties,
            created_at,
            updated_at,
        })
    }

    /// Upserts a node on `conn` and returns its handle.
    ///
    /// The `ON CONFLICT` clause updates metadata in place: the conflicting
    /// row keeps its `handle` and `created_at`, a NULL incoming label or
    /// property bag leaves the stored value untouched, and an incoming bag
    /// merges via `json_patch` (new keys overwrite).
    fn ensure_node_on(
        conn: &Connection,
        entity_type: &str,
        entity_id: &str,
        label: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<NodeHandle> {
        validate_identity(entity_type, entity_id)?;
        let properties_json = properties_to_json("ensure_node", properties)?;

        conn.execute(
            "INSERT INTO graph_nodes (entity_type, entity_id, label, properties, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(entity_type, entity_id) DO UPDATE SET
                 label = COALESCE(excluded.label, label),
                 properties = CASE
                     WHEN excluded.properties IS NULL THEN properties
                     ELSE json_patch(COALESCE(properties, '{}'), excluded.properties)
                 END",
            params![
                entity_type,
                entity_id,
                label,
                properties_json,
                current_timestamp()
            ],
        )
        .map_err(storage_err("ensure_node"))?;

        let handle: i64 = conn
            .query_row(
                "SELECT handle FROM graph_nodes WHERE entity_type = ?1 AND entity_id = ?2",
                params![entity_type, entity_id],
                |row| row.get(0),
            )
            .map_err(storage_err("ensure_node_handle"))?;

        Ok(NodeHandle::new(handle))
    }
}

impl GraphStore for SqliteGraphStore {
    // ========================================================================
    // Identity Store
    // ========================================================================

    #[instrument(skip(self, properties))]
    fn ensure_node(
        &self,
        entity_type: &str,
        entity_id: &str,
        label: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<NodeHandle> {
        let conn = acquire_lock(&self.conn);
        Self::ensure_node_on(&conn, entity_type, entity_id, label, properties)
    }

    #[instrument(skip(self))]
    fn lookup(&self, entity_type: &str, entity_id: &str) -> Result<Option<NodeHandle>> {
        let conn = acquire_lock(&self.conn);

        let handle: Option<i64> = conn
            .query_row(
                "SELECT handle FROM graph_nodes WHERE entity_type = ?1 AND entity_id = ?2",
                params![entity_type, entity_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err("lookup"))?;

        Ok(handle.map(NodeHandle::new))
    }

    #[instrument(skip(self))]
    fn node(&self, handle: NodeHandle) -> Result<Option<Node>> {
        let conn = acquire_lock(&self.conn);

        conn.query_row(
            "SELECT handle, entity_type, entity_id, label, properties, created_at
             FROM graph_nodes WHERE handle = ?1",
            params![handle.as_i64()],
            Self::parse_node_row,
        )
        .optional()
        .map_err(storage_err("node"))
    }

    // ========================================================================
    // Edge Store
    // ========================================================================

    #[instrument(skip(self, properties))]
    fn observe_edge(
        &self,
        from_type: &str,
        from_id: &str,
        to_type: &str,
        to_id: &str,
        edge_type: &str,
        weight_delta: f64,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<()> {
        validate_identity(from_type, from_id)?;
        validate_identity(to_type, to_id)?;
        if edge_type.is_empty() {
            return Err(Error::InvalidInput("edge_type is empty".to_string()));
        }
        validate_weight_delta(weight_delta)?;
        let properties_json = properties_to_json("observe_edge", properties)?;

        let mut conn = acquire_lock(&self.conn);
        let tx = conn
            .transaction()
            .map_err(storage_err("observe_edge_begin"))?;

        let from = Self::ensure_node_on(&tx, from_type, from_id, None, None)?;
        let to = Self::ensure_node_on(&tx, to_type, to_id, None, None)?;

        // The increment-or-insert is one statement, so repeated observation
        // of the same triple accumulates weight without a read-modify-write
        // window.
        let now = current_timestamp();
        tx.execute(
            "INSERT INTO graph_edges
                 (from_handle, to_handle, edge_type, weight, properties, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(from_handle, to_handle, edge_type) DO UPDATE SET
                 weight = weight + excluded.weight,
                 properties = CASE
                     WHEN excluded.properties IS NULL THEN properties
                     ELSE json_patch(COALESCE(properties, '{}'), excluded.properties)
                 END,
                 updated_at = excluded.updated_at",
            params![
                from.as_i64(),
                to.as_i64(),
                edge_type,
                weight_delta,
                properties_json,
                now
            ],
        )
        .map_err(storage_err("observe_edge"))?;

        tx.commit().map_err(storage_err("observe_edge_commit"))
    }

    #[instrument(skip(self))]
    fn remove_edge(&self, from: NodeHandle, to: NodeHandle, edge_type: &str) -> Result<bool> {
        let conn = acquire_lock(&self.conn);

        let deleted = conn
            .execute(
                "DELETE FROM graph_edges
                 WHERE from_handle = ?1 AND to_handle = ?2 AND edge_type = ?3",
                params![from.as_i64(), to.as_i64(), edge_type],
            )
            .map_err(storage_err("remove_edge"))?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self))]
    fn edges_touching(&self, handle: NodeHandle) -> Result<Vec<Edge>> {
        let conn = acquire_lock(&self.conn);

        let mut stmt = conn
            .prepare(
                "SELECT from_handle, to_handle, edge_type, weight, properties,
                        created_at, updated_at
                 FROM graph_edges
                 WHERE from_handle = ?1 OR to_handle = ?1
                 ORDER BY from_handle, to_handle, edge_type",
            )
            .map_err(storage_err("edges_touching_prepare"))?;

        let edges = stmt
            .query_map(params![handle.as_i64()], Self::parse_edge_row)
            .map_err(storage_err("edges_touching"))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(edges)
    }

    #[instrument(skip(self))]
    fn clear_edges_of_kinds(&self, edge_types: &[&str]) -> Result<usize> {
        if edge_types.is_empty() {
            return Ok(0);
        }

        let conn = acquire_lock(&self.conn);

        let placeholders: Vec<String> = (1..=edge_types.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "DELETE FROM graph_edges WHERE edge_type IN ({})",
            placeholders.join(", ")
        );

        let params_vec: Vec<&dyn rusqlite::ToSql> = edge_types
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();

        conn.execute(&sql, params_vec.as_slice())
            .map_err(storage_err("clear_edges_of_kinds"))
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    #[instrument(skip(self))]
    fn stats(&self) -> Result<GraphStats> {
        let conn = acquire_lock(&self.conn);

        let total_nodes: i64 = conn
            .query_row("SELECT COUNT(*) FROM graph_nodes", [], |row| row.get(0))
            .map_err(storage_err("stats_nodes"))?;

        let total_edges: i64 = conn
            .query_row("SELECT COUNT(*) FROM graph_edges", [], |row| row.get(0))
            .map_err(storage_err("stats_edges"))?;

        let mut nodes_by_type = HashMap::new();
        let mut stmt = conn
            .prepare("SELECT entity_type, COUNT(*) FROM graph_nodes GROUP BY entity_type")
            .map_err(storage_err("stats_nodes_by_type_prepare"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(storage_err("stats_nodes_by_type"))?;
        for row in rows.flatten() {
            nodes_by_type.insert(row.0, row.1 as usize);
        }

        let mut edges_by_type = HashMap::new();
        let mut stmt = conn
            .prepare("SELECT edge_type, COUNT(*) FROM graph_edges GROUP BY edge_type")
            .map_err(storage_err("stats_edges_by_type_prepare"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(storage_err("stats_edges_by_type"))?;
        for row in rows.flatten() {
            edges_by_type.insert(row.0, row.1 as usize);
        }

        Ok(GraphStats {
            total_nodes: total_nodes as usize,
            total_edges: total_edges as usize,
            nodes_by_type,
            edges_by_type,
        })
    }

    #[instrument(skip(self))]
    fn clear(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        conn.execute("DELETE FROM graph_edges", [])
            .map_err(storage_err("clear_edges"))?;
        conn.execute("DELETE FROM graph_nodes", [])
            .map_err(storage_err("clear_nodes"))?;

        Ok(())
    }
}
