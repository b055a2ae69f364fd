//! Ephemeral views returned by traversal queries.
//!
//! None of these types are persisted; they exist so the search/chat layer can
//! render query answers without additional store lookups. All of them
//! serialize to JSON.

use crate::models::NodeHandle;
use serde::{Deserialize, Serialize};

/// A single neighbor of a node, as returned by neighbor enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Entity type of the neighboring node.
    pub entity_type: String,
    /// Entity id of the neighboring node.
    pub entity_id: String,
    /// Display label of the neighboring node, if set.
    pub label: Option<String>,
    /// Type of the connecting edge.
    pub edge_type: String,
    /// Accumulated weight of the connecting edge.
    pub weight: f64,
}

/// One hop of a shortest path: the edge type traversed between two handles.
///
/// `from` and `to` record traversal order, which may be the reverse of the
/// stored edge direction - path finding treats the graph as undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Handle the hop starts from.
    pub from: NodeHandle,
    /// Type of the edge traversed.
    pub edge_type: String,
    /// Handle the hop arrives at.
    pub to: NodeHandle,
}

/// A node inside a [`Subgraph`], with its handle resolved back to the
/// external identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphNode {
    /// Internal handle, referenced by the subgraph's edges.
    pub handle: NodeHandle,
    /// Entity type of the node.
    pub entity_type: String,
    /// Entity id of the node.
    pub entity_id: String,
    /// Display label, if set.
    pub label: Option<String>,
}

/// An edge inside a [`Subgraph`], referencing handles from the node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphEdge {
    /// Source handle.
    pub from: NodeHandle,
    /// Target handle.
    pub to: NodeHandle,
    /// Edge type.
    pub edge_type: String,
    /// Accumulated weight.
    pub weight: f64,
}

/// A bounded neighborhood around a starting node.
///
/// Produced by breadth-first expansion up to a depth limit; depth 0 is the
/// start node alone. Edges reference handles present in `nodes`, so callers
/// can reconstruct the graph without further lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    /// Nodes visited within the depth bound.
    pub nodes: Vec<SubgraphNode>,
    /// Every stored edge whose endpoints are both in `nodes`.
    pub edges: Vec<SubgraphEdge>,
}

impl Subgraph {
    /// Creates an empty subgraph.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Returns true if the subgraph contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node in the result set by handle.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&SubgraphNode> {
        self.nodes.iter().find(|n| n.handle == handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_subgraph() {
        let sg = Subgraph::new();
        assert!(sg.is_empty());
        assert!(sg.node(NodeHandle::new(1)).is_none());
    }

    #[test]
    fn test_subgraph_node_lookup() {
        let sg = Subgraph {
            nodes: vec![SubgraphNode {
                handle: NodeHandle::new(3),
                entity_type: "file".to_string(),
                entity_id: "9".to_string(),
                label: Some("notes.md".to_string()),
            }],
            edges: Vec::new(),
        };
        assert!(!sg.is_empty());
        assert_eq!(
            sg.node(NodeHandle::new(3)).map(|n| n.entity_id.as_str()),
            Some("9")
        );
    }

    #[test]
    fn test_subgraph_serializes_with_handles() {
        let sg = Subgraph {
            nodes: vec![SubgraphNode {
                handle: NodeHandle::new(1),
                entity_type: "file".to_string(),
                entity_id: "1".to_string(),
                label: None,
            }],
            edges: vec![SubgraphEdge {
                from: NodeHandle::new(1),
                to: NodeHandle::new(1),
                edge_type: "related_to".to_string(),
                weight: 2.0,
            }],
        };
        let json = serde_json::to_string(&sg).unwrap_or_default();
        assert!(json.contains("\"handle\":1"));
        assert!(json.contains("\"edge_type\":\"related_to\""));
    }
}
