//! Edge types for the relationship graph.
//!
//! An edge is a directed, typed, weighted relationship between two node
//! handles. At most one edge row exists per `(from, to, edge_type)` triple;
//! repeated observation of the same triple accumulates into `weight` instead
//! of creating duplicates.
//!
//! # Relationship Kinds
//!
//! The store accepts arbitrary edge-type strings; the builder-managed kinds
//! are:
//!
//! - `belongs_to` - file → project membership
//! - `tagged_with` - file → tag assignment
//! - `related_to` - file → file co-occurrence (weight carries strength)

use crate::models::NodeHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Well-known relationship kinds managed by the graph builder.
///
/// `rebuild` resets exactly these kinds before ingesting, so edges of any
/// other type survive a rebuild untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// File belongs to a project.
    BelongsTo,
    /// File carries a tag.
    TaggedWith,
    /// Files were observed together; weight carries the co-occurrence
    /// strength.
    RelatedTo,
}

impl EdgeKind {
    /// Returns all edge kind variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::BelongsTo, Self::TaggedWith, Self::RelatedTo]
    }

    /// Returns the edge kind as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BelongsTo => "belongs_to",
            Self::TaggedWith => "tagged_with",
            Self::RelatedTo => "related_to",
        }
    }

    /// Parses an edge kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "belongs_to" | "belongsto" | "member_of" => Some(Self::BelongsTo),
            "tagged_with" | "taggedwith" | "tagged" => Some(Self::TaggedWith),
            "related_to" | "relatedto" | "related" => Some(Self::RelatedTo),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown edge kind: {s}"))
    }
}

/// Direction selector for neighbor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Edges where the node is the `from` endpoint.
    Out,
    /// Edges where the node is the `to` endpoint.
    In,
    /// Union of both directions.
    Both,
}

impl Direction {
    /// Returns the direction as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Out => "out",
            Self::In => "in",
            Self::Both => "both",
        }
    }

    /// Parses a direction from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "out" | "outgoing" => Some(Self::Out),
            "in" | "incoming" => Some(Self::In),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Returns true if outgoing edges are selected.
    #[must_use]
    pub const fn includes_outgoing(self) -> bool {
        matches!(self, Self::Out | Self::Both)
    }

    /// Returns true if incoming edges are selected.
    #[must_use]
    pub const fn includes_incoming(self) -> bool {
        matches!(self, Self::In | Self::Both)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed, typed, weighted edge between two node handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node handle.
    pub from: NodeHandle,
    /// Target node handle.
    pub to: NodeHandle,
    /// Relationship kind (open vocabulary).
    pub edge_type: String,
    /// Accumulated relationship strength; non-negative.
    pub weight: f64,
    /// Open property bag; last write wins per key.
    pub properties: HashMap<String, String>,
    /// Unix timestamp of first observation.
    pub created_at: i64,
    /// Unix timestamp of the most recent observation.
    pub updated_at: i64,
}

impl Edge {
    /// Returns the endpoint opposite to `handle`, treating the edge as
    /// undirected. Returns `None` if `handle` is not an endpoint.
    ///
    /// For a self-loop both endpoints coincide, so the node itself is
    /// returned.
    #[must_use]
    pub fn other_endpoint(&self, handle: NodeHandle) -> Option<NodeHandle> {
        if self.from == handle {
            Some(self.to)
        } else if self.to == handle {
            Some(self.from)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: i64, to: i64) -> Edge {
        Edge {
            from: NodeHandle::new(from),
            to: NodeHandle::new(to),
            edge_type: "related_to".to_string(),
            weight: 1.0,
            properties: HashMap::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_edge_kind_parse() {
        assert_eq!(EdgeKind::parse("belongs_to"), Some(EdgeKind::BelongsTo));
        assert_eq!(EdgeKind::parse("tagged-with"), Some(EdgeKind::TaggedWith));
        assert_eq!(EdgeKind::parse("related"), Some(EdgeKind::RelatedTo));
        assert_eq!(EdgeKind::parse("unknown"), None);
    }

    #[test]
    fn test_edge_kind_round_trip() {
        for kind in EdgeKind::all() {
            assert_eq!(EdgeKind::parse(kind.as_str()), Some(*kind));
        }
    }

    #[test]
    fn test_direction_selectors() {
        assert!(Direction::Out.includes_outgoing());
        assert!(!Direction::Out.includes_incoming());
        assert!(Direction::In.includes_incoming());
        assert!(!Direction::In.includes_outgoing());
        assert!(Direction::Both.includes_outgoing());
        assert!(Direction::Both.includes_incoming());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("out"), Some(Direction::Out));
        assert_eq!(Direction::parse("incoming"), Some(Direction::In));
        assert_eq!(Direction::parse("BOTH"), Some(Direction::Both));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_other_endpoint() {
        let e = edge(1, 2);
        assert_eq!(e.other_endpoint(NodeHandle::new(1)), Some(NodeHandle::new(2)));
        assert_eq!(e.other_endpoint(NodeHandle::new(2)), Some(NodeHandle::new(1)));
        assert_eq!(e.other_endpoint(NodeHandle::new(3)), None);

        let loop_edge = edge(5, 5);
        assert_eq!(
            loop_edge.other_endpoint(NodeHandle::new(5)),
            Some(NodeHandle::new(5))
        );
    }
}
