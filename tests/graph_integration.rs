//! Relationship graph integration tests.
//!
//! Exercises the full ingest → store → query path against the `SQLite`
//! backend, including persistence across reopen, plus the rebuild contract
//! of the graph builder.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use filegraph::{
    Direction, FileGraph, FileLink, FileRecord, GraphBuilder, InMemoryGraphStore,
    SqliteGraphStore, TraversalLimits,
};
use tempfile::TempDir;
use test_case::test_case;

/// Helper to create a file-backed graph for testing.
fn create_graph(temp_dir: &TempDir) -> FileGraph<SqliteGraphStore> {
    let db_path = temp_dir.path().join("test_graph.db");
    let store = SqliteGraphStore::new(&db_path).expect("Failed to create graph store");
    FileGraph::new(store)
}

/// Helper to create an in-memory graph for tests that do not reopen.
fn create_memory_graph() -> FileGraph<SqliteGraphStore> {
    FileGraph::new(SqliteGraphStore::in_memory().expect("Failed to create graph store"))
}

/// Builds the chain a - b - c - d out of `related_to` edges.
fn build_chain(graph: &FileGraph<SqliteGraphStore>) {
    for (from, to) in [("a", "b"), ("b", "c"), ("c", "d")] {
        graph
            .observe_edge("file", from, "file", to, "related_to", 1.0, None)
            .unwrap();
    }
}

// ============================================================================
// Identity Tests
// ============================================================================

/// Test: ensuring the same identity twice yields one node and one handle.
#[test]
fn test_idempotent_identity() {
    let graph = create_memory_graph();

    let first = graph.ensure_node("file", "1", Some("a.pdf"), None).unwrap();
    let second = graph.ensure_node("file", "1", Some("a.pdf"), None).unwrap();

    assert_eq!(first, second);
    assert_eq!(graph.stats().unwrap().total_nodes, 1);
}

/// Test: metadata updates never reassign the handle, so edges stay attached.
#[test]
fn test_handle_stable_across_metadata_updates() {
    let graph = create_memory_graph();

    let handle = graph
        .ensure_node("file", "1", Some("draft.pdf"), None)
        .unwrap();
    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();

    let renamed = graph
        .ensure_node("file", "1", Some("final.pdf"), None)
        .unwrap();
    assert_eq!(handle, renamed);

    let members = graph
        .neighbors("project", "Acme", None, Direction::In)
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].label.as_deref(), Some("final.pdf"));
}

/// Test: empty identity fields are rejected before touching storage.
#[test]
fn test_validation_rejects_empty_identity() {
    let graph = create_memory_graph();

    assert!(graph.ensure_node("", "1", None, None).is_err());
    assert!(graph.ensure_node("file", "", None, None).is_err());
    assert!(graph
        .observe_edge("file", "1", "", "Acme", "belongs_to", 1.0, None)
        .is_err());
    assert_eq!(graph.stats().unwrap().total_nodes, 0);
}

// ============================================================================
// Edge Tests
// ============================================================================

/// Test: repeated observation accumulates into one edge row.
#[test]
fn test_weight_accumulation() {
    let graph = create_memory_graph();

    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();
    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();

    let stats = graph.stats().unwrap();
    assert_eq!(stats.total_edges, 1);

    let members = graph
        .neighbors("project", "Acme", None, Direction::In)
        .unwrap();
    assert!((members[0].weight - 2.0).abs() < f64::EPSILON);
}

/// Test: the concrete invoice/Acme scenario from the ingest contract.
#[test]
fn test_invoice_scenario() {
    let graph = create_memory_graph();

    graph
        .ensure_node("file", "1", Some("invoice.pdf"), None)
        .unwrap();
    graph.ensure_node("project", "Acme", None, None).unwrap();
    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();
    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();

    let members = graph
        .neighbors("project", "Acme", Some("belongs_to"), Direction::In)
        .unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].entity_type, "file");
    assert_eq!(members[0].entity_id, "1");
    assert_eq!(members[0].label.as_deref(), Some("invoice.pdf"));
    assert_eq!(members[0].edge_type, "belongs_to");
    assert!((members[0].weight - 2.0).abs() < f64::EPSILON);
}

/// Test: removing an edge is idempotent and leaves nodes alone.
#[test]
fn test_remove_edge() {
    let graph = create_memory_graph();

    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();

    assert!(graph
        .remove_edge("file", "1", "project", "Acme", "belongs_to")
        .unwrap());
    assert!(!graph
        .remove_edge("file", "1", "project", "Acme", "belongs_to")
        .unwrap());

    let stats = graph.stats().unwrap();
    assert_eq!(stats.total_edges, 0);
    assert_eq!(stats.total_nodes, 2);
}

// ============================================================================
// Traversal Tests
// ============================================================================

/// Test: a directed edge is reachable from both endpoints in one hop.
#[test]
fn test_symmetric_traversal() {
    let graph = create_memory_graph();

    graph
        .observe_edge("file", "1", "project", "Acme", "belongs_to", 1.0, None)
        .unwrap();

    let forward = graph
        .shortest_path("file", "1", "project", "Acme", 1)
        .unwrap();
    assert_eq!(forward.map(|p| p.len()), Some(1));

    let backward = graph
        .shortest_path("project", "Acme", "file", "1", 1)
        .unwrap();
    assert_eq!(backward.map(|p| p.len()), Some(1));
}

/// Test: hop bound on the a-b-c-d chain.
#[test_case(5, Some(3) ; "slack depth finds three hops")]
#[test_case(3, Some(3) ; "exact depth finds three hops")]
#[test_case(2, None ; "tight depth finds nothing")]
fn test_depth_bound(max_depth: usize, expected_hops: Option<usize>) {
    let graph = create_memory_graph();
    build_chain(&graph);

    let path = graph
        .shortest_path("file", "a", "file", "d", max_depth)
        .unwrap();
    assert_eq!(path.map(|p| p.len()), expected_hops);
}

/// Test: same-node queries return an empty path, not `None`.
#[test]
fn test_same_node_path_is_empty() {
    let graph = create_memory_graph();
    graph.ensure_node("file", "1", None, None).unwrap();

    let path = graph.shortest_path("file", "1", "file", "1", 0).unwrap();
    assert_eq!(path, Some(vec![]));
}

/// Test: disconnected components never connect, regardless of depth.
#[test]
fn test_unreachable_path() {
    let graph = create_memory_graph();
    graph.ensure_node("file", "island", None, None).unwrap();
    graph.ensure_node("file", "mainland", None, None).unwrap();

    for depth in [1, 10, 1000] {
        assert_eq!(
            graph
                .shortest_path("file", "island", "file", "mainland", depth)
                .unwrap(),
            None
        );
    }
}

/// Test: subgraph at depth 1 contains the start, its neighbor, and the
/// single connecting edge - nothing further down the chain.
#[test]
fn test_subgraph_bound() {
    let graph = create_memory_graph();
    build_chain(&graph);

    let sg = graph.subgraph("file", "a", 1).unwrap();

    let ids: Vec<&str> = sg.nodes.iter().map(|n| n.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(sg.edges.len(), 1);

    let a = graph.lookup("file", "a").unwrap().unwrap();
    let b = graph.lookup("file", "b").unwrap().unwrap();
    assert_eq!(sg.edges[0].from, a);
    assert_eq!(sg.edges[0].to, b);
}

/// Test: neighbor enumeration order is pinned to (handle, edge type).
#[test]
fn test_deterministic_neighbor_order() {
    let graph = create_memory_graph();

    graph
        .observe_edge("file", "hub", "file", "late", "related_to", 1.0, None)
        .unwrap();
    graph
        .observe_edge("file", "hub", "file", "early", "related_to", 1.0, None)
        .unwrap();

    // "late" was inserted first so it holds the smaller handle.
    let order: Vec<String> = graph
        .neighbors("file", "hub", None, Direction::Both)
        .unwrap()
        .into_iter()
        .map(|n| n.entity_id)
        .collect();
    assert_eq!(order, vec!["late".to_string(), "early".to_string()]);
}

/// Test: a tiny visited budget stops traversal instead of hanging on a
/// densely connected graph.
#[test]
fn test_traversal_budget() {
    let graph = create_memory_graph().with_limits(TraversalLimits::new().with_node_budget(2));
    build_chain(&graph);

    assert_eq!(
        graph.shortest_path("file", "a", "file", "d", 10).unwrap(),
        None
    );
    assert_eq!(graph.subgraph("file", "a", 10).unwrap().nodes.len(), 2);
}

// ============================================================================
// Statistics Tests
// ============================================================================

/// Test: stats reflect exactly what was inserted.
#[test]
fn test_stats_consistency() {
    let graph = create_memory_graph();

    for i in 0..5 {
        graph
            .ensure_node("file", &i.to_string(), None, None)
            .unwrap();
    }
    graph
        .observe_edge("file", "0", "file", "1", "related_to", 1.0, None)
        .unwrap();
    graph
        .observe_edge("file", "1", "file", "2", "related_to", 1.0, None)
        .unwrap();
    graph
        .observe_edge("file", "0", "file", "2", "related_to", 1.0, None)
        .unwrap();

    let stats = graph.stats().unwrap();
    assert_eq!(stats.total_nodes, 5);
    assert_eq!(stats.total_edges, 3);
    assert_eq!(stats.nodes_by_type.get("file"), Some(&5));
    assert_eq!(stats.edges_by_type.get("related_to"), Some(&3));
}

// ============================================================================
// Persistence Tests
// ============================================================================

/// Test: nodes, edges, and handles survive closing and reopening the store.
#[test]
fn test_persistence_across_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test_graph.db");

    let handle = {
        let graph = FileGraph::new(SqliteGraphStore::new(&db_path).unwrap());
        graph
            .observe_edge("file", "1", "project", "Acme", "belongs_to", 2.5, None)
            .unwrap();
        graph.lookup("file", "1").unwrap().unwrap()
    };

    let reopened = FileGraph::new(SqliteGraphStore::new(&db_path).unwrap());
    assert_eq!(reopened.lookup("file", "1").unwrap(), Some(handle));

    let members = reopened
        .neighbors("project", "Acme", None, Direction::In)
        .unwrap();
    assert_eq!(members.len(), 1);
    assert!((members[0].weight - 2.5).abs() < f64::EPSILON);
}

// ============================================================================
// Rebuild Tests
// ============================================================================

/// Test: rebuilding twice from unchanged facts yields identical weights and
/// stats - the managed-kind reset prevents double counting.
#[test]
fn test_rebuild_idempotence() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let builder = GraphBuilder::new(create_graph(&temp_dir));

    let files = || {
        vec![
            FileRecord::new("1", "invoice.pdf")
                .with_project("Acme")
                .with_tag("finance"),
            FileRecord::new("2", "contract.pdf").with_project("Acme"),
        ]
    };
    let links = || vec![FileLink::new("1", "2", 0.8)];

    let first = builder.rebuild(files(), links()).unwrap();
    let second = builder.rebuild(files(), links()).unwrap();
    assert_eq!(first, second);

    let members = builder.graph().neighbors("project", "Acme", None, Direction::In).unwrap();
    assert!(members.iter().all(|n| (n.weight - 1.0).abs() < f64::EPSILON));
}

/// Test: rebuild works against the in-memory backend the same way.
#[test]
fn test_rebuild_in_memory_backend() {
    let builder = GraphBuilder::new(FileGraph::new(InMemoryGraphStore::new()));

    let stats = builder
        .rebuild(
            vec![FileRecord::new("1", "a.pdf").with_tag("t")],
            Vec::new(),
        )
        .unwrap();
    assert_eq!(stats.total_nodes, 2);
    assert_eq!(stats.total_edges, 1);

    let tagged = builder.files_with_tag("t").unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].entity_id, "1");
}
