//! # Predicate-gated links between nodes.
//!
//! An [`Edge`] connects a node's output to a downstream node's input, guarded
//! by a predicate over the flowing item. Every matching edge fires; there is
//! no priority and no exclusivity between edges.

use std::sync::Arc;

use crate::data::RuleData;
use crate::node::RuleNode;

/// Predicate deciding whether an item is forwarded over an edge.
pub type Predicate = Arc<dyn Fn(&RuleData) -> bool + Send + Sync>;

/// A predicate-gated link to a downstream node.
pub struct Edge {
    condition: Predicate,
    target: RuleNode,
}

impl Edge {
    /// Creates an edge forwarding to `target` when `condition` holds.
    pub fn new(condition: Predicate, target: RuleNode) -> Self {
        Self { condition, target }
    }

    /// Evaluates the edge predicate against `data`.
    pub fn matches(&self, data: &RuleData) -> bool {
        (self.condition)(data)
    }

    /// The downstream node this edge forwards to.
    pub fn target(&self) -> &RuleNode {
        &self.target
    }
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edge")
            .field("target", &self.target.node_id())
            .finish_non_exhaustive()
    }
}
