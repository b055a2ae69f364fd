//! Service layer for filegraph.
//!
//! [`FileGraph`] is the public facade: the full ingest and query API in
//! external `(entity_type, entity_id)` terms. [`GraphBuilder`] is the one
//! adapter that talks to the outside world, turning file-index facts into
//! graph mutations.

mod builder;
mod graph;

pub use builder::{FileLink, FileRecord, GraphBuilder};
pub use graph::FileGraph;
