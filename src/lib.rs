//! # filegraph
//!
//! An embedded relationship graph store for a personal file organizer.
//!
//! filegraph tracks connections between files, projects, and tags as a
//! persistent, weighted property graph and answers traversal queries over it:
//! neighbor enumeration, hop-count shortest paths, and bounded subgraph
//! extraction.
//!
//! ## Features
//!
//! - Stable integer node handles: a `(entity_type, entity_id)` pair keeps its
//!   handle for the lifetime of the graph, so edges never dangle
//! - Weight reinforcement: observing the same relationship again strengthens
//!   the existing edge instead of duplicating it
//! - Pluggable storage (`SQLite` for persistence, in-memory for tests)
//! - Deterministic traversal order and a visited-node budget for bounded work
//!
//! ## Example
//!
//! ```rust,ignore
//! use filegraph::{Direction, FileGraph, SqliteGraphStore};
//!
//! let store = SqliteGraphStore::new("relationships.db")?;
//! let graph = FileGraph::new(store);
//!
//! graph.ensure_node("file", "42", Some("invoice.pdf"), None)?;
//! graph.observe_edge("file", "42", "project", "Acme", "belongs_to", 1.0, None)?;
//!
//! let related = graph.neighbors("project", "Acme", None, Direction::In)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod services;
pub mod storage;
pub mod traversal;

// Re-exports for convenience
pub use config::TraversalLimits;
pub use models::{
    Direction, Edge, EdgeKind, EntityKind, Neighbor, Node, NodeHandle, PathStep, Subgraph,
    SubgraphEdge, SubgraphNode,
};
pub use services::{FileGraph, FileLink, FileRecord, GraphBuilder};
pub use storage::{GraphStats, GraphStore, InMemoryGraphStore, SqliteGraphStore};

/// Error type for filegraph operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty identity fields, negative or non-finite weight deltas |
/// | `OperationFailed` | `SQLite` statements fail, lock poisoning, property serialization fails |
///
/// Querying an unknown node is **not** an error: `neighbors` returns an empty
/// list, `shortest_path` returns `None`, and `subgraph` returns an empty
/// subgraph, because "no relationship found" is a valid answer.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - `entity_type` or `entity_id` is empty on a write call
    /// - A weight delta is negative, NaN, or infinite
    ///
    /// Validation failures are caller bugs: the operation is rejected before
    /// any storage work happens, so retrying without fixing the input will
    /// fail again.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed in the storage layer.
    ///
    /// Raised when:
    /// - `SQLite` database operations fail
    /// - A lock is poisoned beyond recovery
    /// - Property bags cannot be serialized to JSON
    ///
    /// Fatal for the single operation only; the store stays consistent
    /// (mutations run inside a transaction) and the caller decides whether
    /// to retry.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for filegraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Used for the `created_at` / `updated_at` columns on nodes and edges.
/// Uses `SystemTime::now()` with fallback to 0 if the system clock is before
/// the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use filegraph::current_timestamp;
///
/// let ts = current_timestamp();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
