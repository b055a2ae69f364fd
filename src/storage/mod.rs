//! Storage backends for the relationship graph.
//!
//! The [`GraphStore`] trait carries the identity-store and edge-store
//! contracts as object-safe primitives; the traversal engine and service
//! layer are built entirely on top of it.
//!
//! # Available Backends
//!
//! | Backend | Use Case | Features |
//! |---------|----------|----------|
//! | [`SqliteGraphStore`] | Default; embedded | Atomic weight upserts, WAL |
//! | [`InMemoryGraphStore`] | Testing | Fast, no persistence |
//!
//! # Example
//!
//! ```rust,ignore
//! use filegraph::storage::{GraphStore, SqliteGraphStore};
//!
//! let store = SqliteGraphStore::new("relationships.db")?;
//! let file = store.ensure_node("file", "42", Some("invoice.pdf"), None)?;
//! let project = store.ensure_node("project", "Acme", Some("Acme"), None)?;
//! ```

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryGraphStore;
pub use sqlite::SqliteGraphStore;
pub use traits::{GraphStats, GraphStore};
