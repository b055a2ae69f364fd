//! Benchmarks for graph traversal.
//!
//! Benchmark targets:
//! - Neighbor enumeration: <50µs on a 100-node hub
//! - Shortest path: <5ms across a 400-node grid
//! - Subgraph extraction: <5ms for a depth-3 neighborhood
//!
//! The in-memory backend keeps the numbers about traversal cost rather than
//! `SQLite` I/O.

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;

use filegraph::{Direction, FileGraph, GraphStore, InMemoryGraphStore};

/// Builds a 20x20 grid of `related_to` edges.
fn grid_graph() -> FileGraph<InMemoryGraphStore> {
    let store = InMemoryGraphStore::new();
    let id = |x: usize, y: usize| format!("{x}:{y}");
    for x in 0..20 {
        for y in 0..20 {
            if x + 1 < 20 {
                store
                    .observe_edge("file", &id(x, y), "file", &id(x + 1, y), "related_to", 1.0, None)
                    .unwrap();
            }
            if y + 1 < 20 {
                store
                    .observe_edge("file", &id(x, y), "file", &id(x, y + 1), "related_to", 1.0, None)
                    .unwrap();
            }
        }
    }
    FileGraph::new(store)
}

/// Builds a hub node with 100 spokes.
fn hub_graph() -> FileGraph<InMemoryGraphStore> {
    let store = InMemoryGraphStore::new();
    for i in 0..100 {
        store
            .observe_edge("file", "hub", "tag", &format!("t{i}"), "tagged_with", 1.0, None)
            .unwrap();
    }
    FileGraph::new(store)
}

fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors");
    group.measurement_time(Duration::from_secs(3));

    let graph = hub_graph();
    group.bench_function("hub_100_spokes", |b| {
        b.iter(|| {
            black_box(
                graph
                    .neighbors(black_box("file"), black_box("hub"), None, Direction::Both)
                    .unwrap(),
            )
        });
    });

    group.finish();
}

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("shortest_path");
    group.measurement_time(Duration::from_secs(5));

    let graph = grid_graph();
    group.bench_function("grid_corner_to_corner", |b| {
        b.iter(|| {
            black_box(
                graph
                    .shortest_path("file", "0:0", "file", "19:19", 40)
                    .unwrap(),
            )
        });
    });

    group.bench_function("grid_unreachable", |b| {
        graph.store().ensure_node("file", "island", None, None).unwrap();
        b.iter(|| {
            black_box(
                graph
                    .shortest_path("file", "0:0", "file", "island", 40)
                    .unwrap(),
            )
        });
    });

    group.finish();
}

fn bench_subgraph(c: &mut Criterion) {
    let mut group = c.benchmark_group("subgraph");
    group.measurement_time(Duration::from_secs(5));

    let graph = grid_graph();
    group.bench_function("grid_depth_3", |b| {
        b.iter(|| black_box(graph.subgraph("file", "10:10", 3).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_neighbors, bench_shortest_path, bench_subgraph);
criterion_main!(benches);
