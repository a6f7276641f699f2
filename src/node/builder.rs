//! # Builder for [`RuleNode`].

use std::sync::Arc;

use crate::config::{ConcurrencyMode, NodeConfig, StopHookPolicy};
use crate::logic::LogicRef;
use crate::node::RuleNode;

/// Builder for constructing a [`RuleNode`] with optional configuration.
///
/// ## Example
/// ```
/// use rulevisor::{ConcurrencyMode, ExecutionContext, LogicFn, RuleNode};
///
/// let logic = LogicFn::arc(|_ctx: ExecutionContext| async {});
/// let node = RuleNode::builder("instance-1", "filter", logic)
///     .concurrency(ConcurrencyMode::Parallel)
///     .build();
///
/// assert_eq!(node.node_id(), "filter");
/// assert!(!node.is_running());
/// ```
pub struct NodeBuilder {
    instance_id: Arc<str>,
    node_id: Arc<str>,
    logic: LogicRef,
    config: NodeConfig,
}

impl NodeBuilder {
    /// Creates a builder with the default configuration
    /// (sequential fan-out, retained stop hooks).
    pub fn new(
        instance_id: impl Into<Arc<str>>,
        node_id: impl Into<Arc<str>>,
        logic: LogicRef,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            node_id: node_id.into(),
            logic,
            config: NodeConfig::default(),
        }
    }

    /// Sets the fan-out policy for edges and event handlers.
    pub fn concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.config.concurrency = mode;
        self
    }

    /// Sets the stop-hook retention policy.
    pub fn stop_hooks(mut self, policy: StopHookPolicy) -> Self {
        self.config.stop_hooks = policy;
        self
    }

    /// Replaces the whole configuration at once.
    pub fn config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the node in the Stopped state, with no edges, handlers,
    /// observers, or registered consumer.
    pub fn build(self) -> RuleNode {
        RuleNode::from_parts(self.instance_id, self.node_id, self.logic, self.config)
    }
}
