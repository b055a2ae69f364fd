//! Graph store trait shared by all backends.
//!
//! The trait folds the two write-side components - identity store and edge
//! store - into one object-safe surface, plus the read primitives the
//! traversal engine is built on.
//!
//! # Error Modes and Guarantees
//!
//! All methods return `Result<T>` with errors propagated via
//! [`crate::Error`]. Looking up something that does not exist is never an
//! error: `lookup` and `node` return `None`, `edges_touching` returns an
//! empty list.
//!
//! ## Identity Operations
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `ensure_node` | O(1) | Insert or update-in-place; handle never changes |
//! | `lookup` | O(1) | By composite identity |
//! | `node` | O(1) | By handle |
//!
//! ## Edge Operations
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `observe_edge` | O(1) | Atomic increment-or-insert |
//! | `remove_edge` | O(1) | Idempotent |
//! | `edges_touching` | O(k) | k = degree; deterministic order |
//! | `clear_edges_of_kinds` | O(m) | m = matching edges |

use crate::models::{Edge, Node, NodeHandle};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trait for relationship graph backends.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn GraphStore>`; use
///   interior mutability (e.g. `Mutex<Connection>`) for mutable state.
/// - `ensure_node` must never reassign an existing handle: edges reference
///   nodes by handle, so identity churn silently orphans them.
/// - `observe_edge` must be a single logical step - endpoint vivification
///   plus the weight increment either all happen or none do, and two
///   concurrent observers of the same triple must not lose an increment.
/// - `edges_touching` must return edges in `(from, to, edge_type)` order so
///   traversal results are reproducible across backends.
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Identity Store
    // ========================================================================

    /// Inserts a node or updates its metadata in place.
    ///
    /// If `(entity_type, entity_id)` already exists, `label` and
    /// `properties` are applied to the existing row and the **existing**
    /// handle is returned unchanged. A `None` label or property bag leaves
    /// the stored value untouched, so auto-vivification through
    /// [`observe_edge`](Self::observe_edge) never erases metadata. A
    /// `Some(..)` property bag merges into the stored bag, new keys
    /// overwriting.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for empty identity fields, or
    /// [`crate::Error::OperationFailed`] if storage fails.
    fn ensure_node(
        &self,
        entity_type: &str,
        entity_id: &str,
        label: Option<&str>,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<NodeHandle>;

    /// Resolves a composite identity to its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup operation fails.
    fn lookup(&self, entity_type: &str, entity_id: &str) -> Result<Option<NodeHandle>>;

    /// Resolves a handle back to its node record.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup operation fails.
    fn node(&self, handle: NodeHandle) -> Result<Option<Node>>;

    // ========================================================================
    // Edge Store
    // ========================================================================

    /// Records one observation of a relationship.
    ///
    /// Both endpoints are created lazily if absent. If an edge with the same
    /// `(from, to, edge_type)` triple exists, `weight_delta` is added to its
    /// weight and `properties` merge in (new keys overwrite); otherwise a
    /// new edge is inserted with `weight = weight_delta`.
    ///
    /// The whole operation is atomic: a failure leaves neither a partial
    /// endpoint nor a half-applied increment behind.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for empty identity fields or a
    /// negative/non-finite delta, or [`crate::Error::OperationFailed`] if
    /// storage fails.
    #[allow(clippy::too_many_arguments)]
    fn observe_edge(
        &self,
        from_type: &str,
        from_id: &str,
        to_type: &str,
        to_id: &str,
        edge_type: &str,
        weight_delta: f64,
        properties: Option<&HashMap<String, String>>,
    ) -> Result<()>;

    /// Deletes the edge for a `(from, to, edge_type)` triple.
    ///
    /// Returns `true` if a row was deleted, `false` if no such edge existed
    /// (an idempotent no-op, not an error).
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion operation fails.
    fn remove_edge(&self, from: NodeHandle, to: NodeHandle, edge_type: &str) -> Result<bool>;

    /// Returns every edge where `handle` is either endpoint, ordered by
    /// `(from, to, edge_type)`.
    ///
    /// This is the read primitive the traversal engine expands on.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn edges_touching(&self, handle: NodeHandle) -> Result<Vec<Edge>>;

    /// Deletes every edge whose type is in `edge_types`.
    ///
    /// Used by the graph builder to reset its managed relationship kinds
    /// before a rebuild. Returns the number of edges removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion operation fails.
    fn clear_edges_of_kinds(&self, edge_types: &[&str]) -> Result<usize>;

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Returns aggregate counts over the current store state.
    ///
    /// Read-committed consistency: the counts reflect the store at call
    /// time, with no point-in-time snapshot guarantee.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregation fails.
    fn stats(&self) -> Result<GraphStats>;

    /// Clears all graph data.
    ///
    /// Use with caution - this removes every node and edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    fn clear(&self) -> Result<()>;
}

/// Aggregate statistics over the relationship graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of nodes.
    pub total_nodes: usize,
    /// Total number of edges.
    pub total_edges: usize,
    /// Node counts keyed by entity type.
    pub nodes_by_type: HashMap<String, usize>,
    /// Edge counts keyed by edge type.
    pub edges_by_type: HashMap<String, usize>,
}

impl GraphStats {
    /// Creates empty stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
