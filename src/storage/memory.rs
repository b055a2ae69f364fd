//! In-memory graph store for testing.
//!
//! Provides a fast, non-persistent implementation of [`GraphStore`] for use
//! in unit tests and ephemeral graphs.

use crate::models::{
    validate_identity, validate_weight_delta, Edge, Node, NodeHandle,
};
use crate::storage::traits::{GraphStats, GraphStore};
use crate::{current_timestamp, Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Mutable graph state behind one lock.
///
/// All of it sits behind a single `RwLock` so `observe_edge` (endpoint
/// vivification plus the weight increment) is one logical step, matching the
/// transaction the `SQLite` backend uses.
#[derive(Debug, Default)]
struct GraphState {
    next_handle: i64,
    nodes: BTreeMap<NodeHandle, Node>,
    identity_index: HashMap<(String, String), NodeHandle>,
    edges: BTreeMap<(NodeHandle, NodeHandle, String), Edge>,
}

impl GraphState {
    fn ensure_node(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        label: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> NodeHandle {
        let key = (entity_type.to_string(), entity_id.to_string());

        if let Some(&handle) = self.identity_index.get(&key) {
            if let Some(node) = self.nodes.get_mut(&handle) {
                if let Some(label) = label {
                    node.label = Some(label.to_string());
                }
                if let Some(properties) = properties {
                    for (k, v) in properties {
                        node.properties.insert(k.clone(), v.clone());
                    }
                }
            }
            return handle;
        }

        self.next_handle += 1;
        let handle = NodeHandle::new(self.next_handle);
        self.nodes.insert(
            handle,
            Node {
                handle,
                entity_type: entity_type.to_string(),
                entity_id: entity_id.to_string(),
                label: label.map(ToString::to_string),
                properties: properties.cloned().unwrap_or_default(),
                created_at: current_timestamp(),
            },
        );
        self.identity_index.insert(key, handle);
        handle
    }
}

/// In-memory graph store for testing.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
/// Data is not persisted between runs. The `BTreeMap` edge index keeps
/// `edges_touching` in `(from, to, edge_type)` order without an explicit
/// sort.
///
/// # Example
///
/// ```rust,ignore
/// use filegraph::storage::{GraphStore, InMemoryGraphStore};
///
/// let store = InMemoryGraphStore::new();
/// // Use for testing...
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
}

impl InMemoryGraphStore {
    /// Creates a new empty in-memory graph store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes stored.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.state.read().map(|s| s.nodes.len()).unwrap_or(0)
    }

    /// Returns the number of edges stored.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.state.read().map(|s| s.edges.len()).unwrap_or(0)
    }

    fn read_state(&self, operation: &str) -> Result<std::sync::RwLockReadGuard<'_, GraphState>> {
        self.state.read().map_err(|_| Error::OperationFailed {
            operation: operation.to_string(),
            cause: "lock poisoned".to_string(),
        })
    }

    fn write_state(&self, operation: &str) -> Result<std::sync::RwLockWriteGuard<'_, GraphState>> {
        self.state.write().map_err(|_| Error::OperationFailed {
            operation: operation.to_string(),
            cause: "lock poisoned".to_string(),
        })
    }
}

impl GraphStore for InMemoryGraphStore {
    fn ensure_node(
        &self,
        entity_type: &str,
        entity_id: &str,
        label: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<NodeHandle> {
        validate_identity(entity_type, entity_id)?;

        let mut state = self.write_state("ensure_node")?;
        Ok(state.ensure_node(entity_type, entity_id, label, properties))
    }

    fn lookup(&self, entity_type: &str, entity_id: &str) -> Result<Option<NodeHandle>> {
        let state = self.read_state("lookup")?;
        Ok(state
            .identity_index
            .get(&(entity_type.to_string(), entity_id.to_string()))
            .copied())
    }

    fn node(&self, handle: NodeHandle) -> Result<Option<Node>> {
        let state = self.read_state("node")?;
        Ok(state.nodes.get(&handle).cloned())
    }

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

        let mut state = self.write_state("observe_edge")?;

        let from = state.ensure_node(from_type, from_id, None, None);
        let to = state.ensure_node(to_type, to_id, None, None);

        let now = current_timestamp();
        let key = (from, to, edge_type.to_string());
        if let Some(edge) = state.edges.get_mut(&key) {
            edge.weight += weight_delta;
            if let Some(properties) = properties {
                for (k, v) in properties {
                    edge.properties.insert(k.clone(), v.clone());
                }
            }
            edge.updated_at = now;
        } else {
            state.edges.insert(
                key,
                Edge {
                    from,
                    to,
                    edge_type: edge_type.to_string(),
                    weight: weight_delta,
                    properties: properties.cloned().unwrap_or_default(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }

        Ok(())
    }

    fn remove_edge(&self, from: NodeHandle, to: NodeHandle, edge_type: &str) -> Result<bool> {
        let mut state = self.write_state("remove_edge")?;
        Ok(state
            .edges
            .remove(&(from, to, edge_type.to_string()))
            .is_some())
    }

    fn edges_touching(&self, handle: NodeHandle) -> Result<Vec<Edge>> {
        let state = self.read_state("edges_touching")?;
        // BTreeMap iteration order is (from, to, edge_type), the documented
        // deterministic ordering.
        Ok(state
            .edges
            .values()
            .filter(|e| e.from == handle || e.to == handle)
            .cloned()
            .collect())
    }

    fn clear_edges_of_kinds(&self, edge_types: &[&str]) -> Result<usize> {
        let mut state = self.write_state("clear_edges_of_kinds")?;
        let before = state.edges.len();
        state
            .edges
            .retain(|_, edge| !edge_types.contains(&edge.edge_type.as_str()));
        Ok(before - state.edges.len())
    }

    fn stats(&self) -> Result<GraphStats> {
        let state = self.read_state("stats")?;

        let mut nodes_by_type: HashMap<String, usize> = HashMap::new();
        for node in state.nodes.values() {
            *nodes_by_type.entry(node.entity_type.clone()).or_insert(0) += 1;
        }

        let mut edges_by_type: HashMap<String, usize> = HashMap::new();
        for edge in state.edges.values() {
            *edges_by_type.entry(edge.edge_type.clone()).or_insert(0) += 1;
        }

        Ok(GraphStats {
            total_nodes: state.nodes.len(),
            total_edges: state.edges.len(),
            nodes_by_type,
            edges_by_type,
        })
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.write_state("clear")?;
        state.nodes.clear();
        state.identity_index.clear();
        state.edges.clear();
        // next_handle deliberately not reset: handles are never reused.
        Ok(())
    }
}
