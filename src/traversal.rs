//! Breadth-first traversal over a [`GraphStore`].
//!
//! Everything here is built on two store reads - `edges_touching` and `node`
//! - so any backend gets the same traversal semantics:
//!
//! - Neighbor enumeration honors stored edge direction.
//! - Path finding and subgraph extraction treat edges as **undirected** for
//!   reachability: a `file → tag` edge connects the tag back to the file,
//!   because relationships like "tagged with" are semantically symmetric
//!   even though they are stored directionally.
//! - Enumeration order is pinned: neighbors sort by handle ascending, then
//!   edge type. BFS tie-breaks between equal-length paths follow from that
//!   order, so results are reproducible across backends and runs.
//!
//! A [`TraversalLimits`] visited-node budget bounds worst-case work on
//! densely connected graphs; `max_depth` alone does not, since the frontier
//! can grow exponentially per hop.

use crate::config::TraversalLimits;
use crate::models::{
    Direction, Neighbor, NodeHandle, PathStep, Subgraph, SubgraphEdge, SubgraphNode,
};
use crate::storage::GraphStore;
use crate::Result;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::warn;

/// Traversal engine over a borrowed graph store.
pub struct Traversal<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    limits: TraversalLimits,
}

impl<'a, S: GraphStore + ?Sized> Traversal<'a, S> {
    /// Creates a traversal engine with default limits.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            limits: TraversalLimits::default(),
        }
    }

    /// Creates a traversal engine with explicit limits.
    pub const fn with_limits(store: &'a S, limits: TraversalLimits) -> Self {
        Self { store, limits }
    }

    /// Enumerates the neighbors of a node.
    ///
    /// Each stored edge row contributes at most one entry: its far endpoint,
    /// selected by `direction` (`Out` = rows where the node is `from`, `In` =
    /// rows where it is `to`, `Both` = union). An optional `edge_type`
    /// filter restricts the rows considered. Unknown handles yield an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn neighbors(
        &self,
        start: NodeHandle,
        edge_type: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<Neighbor>> {
        let mut hits: Vec<(NodeHandle, String, f64)> = Vec::new();

        for edge in self.store.edges_touching(start)? {
            if let Some(filter) = edge_type {
                if edge.edge_type != filter {
                    continue;
                }
            }
            if direction.includes_outgoing() && edge.from == start {
                hits.push((edge.to, edge.edge_type, edge.weight));
            } else if direction.includes_incoming() && edge.to == start {
                hits.push((edge.from, edge.edge_type, edge.weight));
            }
        }

        // Documented ordering: neighbor handle ascending, then edge type.
        hits.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let mut neighbors = Vec::with_capacity(hits.len());
        for (handle, edge_type, weight) in hits {
            if let Some(node) = self.store.node(handle)? {
                neighbors.push(Neighbor {
                    entity_type: node.entity_type,
                    entity_id: node.entity_id,
                    label: node.label,
                    edge_type,
                    weight,
                });
            }
        }

        Ok(neighbors)
    }

    /// Finds a shortest path between two handles by hop count.
    ///
    /// Edges are traversed in both directions. Returns `Some(vec![])` when
    /// `from == to`, `None` when no path exists within `max_depth` hops or
    /// the visited-node budget runs out first.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn shortest_path(
        &self,
        from: NodeHandle,
        to: NodeHandle,
        max_depth: usize,
    ) -> Result<Option<Vec<PathStep>>> {
        if from == to {
            return Ok(Some(Vec::new()));
        }

        let mut visited: BTreeSet<NodeHandle> = BTreeSet::new();
        visited.insert(from);
        let mut queue: VecDeque<(NodeHandle, Vec<PathStep>)> = VecDeque::new();
        queue.push_back((from, Vec::new()));

        while let Some((current, path)) = queue.pop_front() {
            if path.len() >= max_depth {
                continue;
            }

            for (neighbor, edge_type) in self.adjacency(current)? {
                if visited.contains(&neighbor) {
                    continue;
                }

                let mut new_path = path.clone();
                new_path.push(PathStep {
                    from: current,
                    edge_type,
                    to: neighbor,
                });

                if neighbor == to {
                    return Ok(Some(new_path));
                }

                if visited.len() >= self.limits.node_budget {
                    warn!(
                        budget = self.limits.node_budget,
                        "shortest_path visited-node budget exhausted, reporting no path"
                    );
                    return Ok(None);
                }

                visited.insert(neighbor);
                queue.push_back((neighbor, new_path));
            }
        }

        Ok(None)
    }

    /// Extracts the bounded neighborhood around a start node.
    ///
    /// Depth 0 is the start node alone; each additional level adds the nodes
    /// one hop further out, traversing edges in both directions. The edge
    /// list contains every stored edge whose endpoints were both visited,
    /// including endpoints sitting exactly at the depth boundary. Unknown
    /// handles yield an empty subgraph.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub fn subgraph(&self, start: NodeHandle, max_depth: usize) -> Result<Subgraph> {
        if self.store.node(start)?.is_none() {
            return Ok(Subgraph::new());
        }

        // BFS node collection; BTreeMap keeps the node list in handle order.
        let mut visited: BTreeMap<NodeHandle, usize> = BTreeMap::new();
        visited.insert(start, 0);
        let mut queue: VecDeque<(NodeHandle, usize)> = VecDeque::new();
        queue.push_back((start, 0));
        let mut budget_hit = false;

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            for (neighbor, _) in self.adjacency(current)? {
                if visited.contains_key(&neighbor) {
                    continue;
                }
                if visited.len() >= self.limits.node_budget {
                    budget_hit = true;
                    break;
                }
                visited.insert(neighbor, depth + 1);
                queue.push_back((neighbor, depth + 1));
            }
            if budget_hit {
                break;
            }
        }

        if budget_hit {
            warn!(
                budget = self.limits.node_budget,
                "subgraph visited-node budget exhausted, returning partial neighborhood"
            );
        }

        // Edge collection: every stored edge between two visited nodes,
        // deduplicated by its identifying triple.
        let mut edges: BTreeMap<(NodeHandle, NodeHandle, String), f64> = BTreeMap::new();
        for &handle in visited.keys() {
            for edge in self.store.edges_touching(handle)? {
                if visited.contains_key(&edge.from) && visited.contains_key(&edge.to) {
                    edges.insert((edge.from, edge.to, edge.edge_type), edge.weight);
                }
            }
        }

        let mut nodes = Vec::with_capacity(visited.len());
        for &handle in visited.keys() {
            if let Some(node) = self.store.node(handle)? {
                nodes.push(SubgraphNode {
                    handle,
                    entity_type: node.entity_type,
                    entity_id: node.entity_id,
                    label: node.label,
                });
            }
        }

        Ok(Subgraph {
            nodes,
            edges: edges
                .into_iter()
                .map(|((from, to, edge_type), weight)| SubgraphEdge {
                    from,
                    to,
                    edge_type,
                    weight,
                })
                .collect(),
        })
    }

    /// Returns the undirected adjacency of a node in traversal order.
    ///
    /// Each stored edge contributes its far endpoint (the node itself for a
    /// self-loop). Sorted by `(neighbor handle, edge_type)` - the documented
    /// BFS expansion order.
    fn adjacency(&self, handle: NodeHandle) -> Result<Vec<(NodeHandle, String)>> {
        let mut neighbors: Vec<(NodeHandle, String)> = self
            .store
            .edges_touching(handle)?
            .into_iter()
            .filter_map(|edge| {
                edge.other_endpoint(handle)
                    .map(|other| (other, edge.edge_type))
            })
            .collect();
        neighbors.sort();
        Ok(neighbors)
    }
}
