//! Node types for the relationship graph.
//!
//! A node represents any typed entity the file organizer knows about. Its
//! externally-visible identity is the `(entity_type, entity_id)` pair; its
//! internal identity is a stable integer [`NodeHandle`] that edges reference.
//!
//! # Entity Types
//!
//! The store accepts arbitrary entity-type strings; the well-known kinds are:
//!
//! | Kind | `entity_id` | Example |
//! |------|-------------|---------|
//! | `file` | Indexer-assigned file id | `"1042"` |
//! | `project` | Project name | `"Acme"` |
//! | `tag` | Tag text | `"invoice"` |
//! | `person` | Contact identifier | `"alice@example.com"` |

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable internal handle for a graph node.
///
/// Handles are allocated once, at first creation of a `(entity_type,
/// entity_id)` pair, and never change for the lifetime of the graph - edges
/// reference nodes by handle, so identity churn would silently orphan them.
/// The ordering on handles is the documented traversal tie-break order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeHandle(i64);

impl NodeHandle {
    /// Creates a handle from a raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeHandle {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Well-known entity kinds.
///
/// The storage layer is deliberately string-typed so new kinds can appear
/// without a schema change; this enum is the typed vocabulary used by the
/// graph builder and convenience queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An indexed file.
    File,
    /// A project grouping files.
    Project,
    /// A tag assigned by the AI tagger or the user.
    Tag,
    /// A person connected to files (sender, author).
    Person,
}

impl EntityKind {
    /// Returns all entity kind variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::File, Self::Project, Self::Tag, Self::Person]
    }

    /// Returns the entity kind as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Project => "project",
            Self::Tag => "tag",
            Self::Person => "person",
        }
    }

    /// Parses an entity kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "file" | "document" => Some(Self::File),
            "project" => Some(Self::Project),
            "tag" | "label" => Some(Self::Tag),
            "person" | "people" | "contact" => Some(Self::Person),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown entity kind: {s}"))
    }
}

/// A node in the relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable internal handle.
    pub handle: NodeHandle,
    /// Entity type half of the composite external identity.
    pub entity_type: String,
    /// Entity id half of the composite external identity.
    pub entity_id: String,
    /// Optional human-readable display string, mutable.
    pub label: Option<String>,
    /// Open property bag; presentation metadata only, never used for
    /// identity or traversal.
    pub properties: HashMap<String, String>,
    /// Unix timestamp of first creation.
    pub created_at: i64,
}

impl Node {
    /// Returns the label, falling back to the entity id when none was set.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.entity_id)
    }
}
