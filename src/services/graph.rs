//! High-level facade over a graph store.
//!
//! Translates between the external composite identities the collaborators
//! speak - `("file", "42")`, `("project", "Acme")` - and the internal
//! handles the store and traversal engine work with.
//!
//! # Example
//!
//! ```rust,ignore
//! use filegraph::{Direction, FileGraph, SqliteGraphStore};
//!
//! let store = SqliteGraphStore::new("relationships.db")?;
//! let graph = FileGraph::new(store);
//!
//! graph.observe_edge("file", "42", "project", "Acme", "belongs_to", 1.0, None)?;
//! let members = graph.neighbors("project", "Acme", Some("belongs_to"), Direction::In)?;
//! ```

use crate::config::TraversalLimits;
use crate::models::{Direction, Neighbor, NodeHandle, PathStep, Subgraph};
use crate::storage::{GraphStats, GraphStore};
use crate::traversal::Traversal;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// High-level service for relationship graph operations.
///
/// Wraps a [`GraphStore`] and provides:
/// - Node and edge ingestion addressed by external identity
/// - Neighbor, shortest-path, and subgraph queries
/// - Aggregate statistics
///
/// Unknown identities on the query side yield empty results or `None`,
/// never errors - "no relationship found" is a valid answer.
///
/// # Thread Safety
///
/// The service is thread-safe when the underlying store is thread-safe;
/// both [`SqliteGraphStore`](crate::storage::SqliteGraphStore) and
/// [`InMemoryGraphStore`](crate::storage::InMemoryGraphStore) are. Cloning
/// the service shares the store.
pub struct FileGraph<S: GraphStore> {
    store: Arc<S>,
    limits: TraversalLimits,
}

impl<S: GraphStore> Clone for FileGraph<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            limits: self.limits,
        }
    }
}

impl<S: GraphStore> FileGraph<S> {
    /// Creates a new graph service owning the given store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            limits: TraversalLimits::default(),
        }
    }

    /// Creates a new graph service with a shared store.
    #[must_use]
    pub fn with_shared_store(store: Arc<S>) -> Self {
        Self {
            store,
            limits: TraversalLimits::default(),
        }
    }

    /// Overrides the traversal limits.
    #[must_use]
    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Ingest API
    // =========================================================================

    /// Inserts a node or updates its metadata in place.
    ///
    /// Returns the node's stable handle; for an existing `(entity_type,
    /// entity_id)` pair the handle is guaranteed to be unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for empty identity fields, or
    /// a storage error.
    pub fn ensure_node(
        &self,
        entity_type: &str,
        entity_id: &str,
        label: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<NodeHandle> {
        self.store
            .ensure_node(entity_type, entity_id, label, properties)
    }

    /// Records one observation of a relationship, creating both endpoints
    /// if needed and accumulating weight on repeat observation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for empty identity fields or a
    /// negative/non-finite `weight_delta`, or a storage error.
    #[allow(clippy::too_many_arguments)]
    pub fn observe_edge(
        &self,
        from_type: &str,
        from_id: &str,
        to_type: &str,
        to_id: &str,
        edge_type: &str,
        weight_delta: f64,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<()> {
        self.store.observe_edge(
            from_type,
            from_id,
            to_type,
            to_id,
            edge_type,
            weight_delta,
            properties,
        )
    }

    /// Deletes the edge between two externally-identified nodes.
    ///
    /// Returns `true` if an edge was removed. Unknown endpoints or a
    /// missing edge are an idempotent no-op (`false`), not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn remove_edge(
        &self,
        from_type: &str,
        from_id: &str,
        to_type: &str,
        to_id: &str,
        edge_type: &str,
    ) -> Result<bool> {
        let Some(from) = self.store.lookup(from_type, from_id)? else {
            return Ok(false);
        };
        let Some(to) = self.store.lookup(to_type, to_id)? else {
            return Ok(false);
        };
        self.store.remove_edge(from, to, edge_type)
    }

    // =========================================================================
    // Query API
    // =========================================================================

    /// Resolves a composite identity to its handle, if the node exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn lookup(&self, entity_type: &str, entity_id: &str) -> Result<Option<NodeHandle>> {
        self.store.lookup(entity_type, entity_id)
    }

    /// Enumerates the neighbors of an externally-identified node.
    ///
    /// Returns an empty list for unknown nodes. Results are ordered by
    /// neighbor handle ascending, then edge type.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn neighbors(
        &self,
        entity_type: &str,
        entity_id: &str,
        edge_type: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<Neighbor>> {
        let Some(handle) = self.store.lookup(entity_type, entity_id)? else {
            return Ok(Vec::new());
        };
        self.traversal().neighbors(handle, edge_type, direction)
    }

    /// Finds a shortest path between two externally-identified nodes by hop
    /// count, traversing edges in both directions.
    ///
    /// Returns `Some(vec![])` when both identities resolve to the same
    /// node, `None` when either node is unknown or no path exists within
    /// `max_depth` hops.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn shortest_path(
        &self,
        from_type: &str,
        from_id: &str,
        to_type: &str,
        to_id: &str,
        max_depth: usize,
    ) -> Result<Option<Vec<PathStep>>> {
        let Some(from) = self.store.lookup(from_type, from_id)? else {
            return Ok(None);
        };
        let Some(to) = self.store.lookup(to_type, to_id)? else {
            return Ok(None);
        };
        self.traversal().shortest_path(from, to, max_depth)
    }

    /// Extracts the bounded neighborhood around an externally-identified
    /// node. Returns an empty subgraph for unknown nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn subgraph(
        &self,
        entity_type: &str,
        entity_id: &str,
        max_depth: usize,
    ) -> Result<Subgraph> {
        let Some(handle) = self.store.lookup(entity_type, entity_id)? else {
            return Ok(Subgraph::new());
        };
        self.traversal().subgraph(handle, max_depth)
    }

    /// Returns aggregate statistics over the current graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregation fails.
    pub fn stats(&self) -> Result<GraphStats> {
        self.store.stats()
    }

    fn traversal(&self) -> Traversal<'_, S> {
        Traversal::with_limits(&self.store, self.limits)
    }
}
