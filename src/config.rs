//! Traversal tuning knobs.
//!
//! The only resource bound the graph store owns is traversal cost: `max_depth`
//! caps hop count per query, and the visited-node budget here caps total work
//! on pathological (densely connected) graphs.

use serde::{Deserialize, Serialize};

/// Default visited-node budget for a single traversal.
pub const DEFAULT_NODE_BUDGET: usize = 10_000;

/// Limits applied to every BFS traversal.
///
/// When the budget is exhausted mid-search, expansion stops: `shortest_path`
/// reports no path found and `subgraph` returns what was collected so far.
/// Exhaustion is logged at `warn` level.
///
/// # Example
///
/// ```rust
/// use filegraph::TraversalLimits;
///
/// let limits = TraversalLimits::new().with_node_budget(500);
/// assert_eq!(limits.node_budget, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalLimits {
    /// Maximum number of distinct nodes a single traversal may visit.
    pub node_budget: usize,
}

impl TraversalLimits {
    /// Creates limits with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }

    /// Sets the visited-node budget.
    #[must_use]
    pub const fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        assert_eq!(TraversalLimits::default().node_budget, DEFAULT_NODE_BUDGET);
    }

    #[test]
    fn test_builder() {
        let limits = TraversalLimits::new().with_node_budget(64);
        assert_eq!(limits.node_budget, 64);
    }
}
