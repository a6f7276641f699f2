//! # Per-node configuration.
//!
//! [`NodeConfig`] controls the two behavioral knobs of a
//! [`RuleNode`](crate::RuleNode):
//!
//! - [`ConcurrencyMode`] — whether fan-out over edges and event handlers runs
//!   one target at a time or concurrently;
//! - [`StopHookPolicy`] — whether stop hooks survive a `stop()` call and run
//!   again on the next one.
//!
//! # Example
//! ```
//! use rulevisor::{ConcurrencyMode, NodeConfig, StopHookPolicy};
//!
//! let mut cfg = NodeConfig::default();
//! cfg.concurrency = ConcurrencyMode::Parallel;
//! cfg.stop_hooks = StopHookPolicy::ClearAfterRun;
//!
//! assert_eq!(cfg.concurrency, ConcurrencyMode::Parallel);
//! ```

/// Fan-out policy for edge traversal and event-handler dispatch.
///
/// Applies both to output routing (matching edges) and to named event
/// handlers. Global observers are always notified sequentially, regardless
/// of this mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Visit matching targets one at a time, awaiting each delivery.
    ///
    /// Traversal order is unspecified; callers must not rely on insertion
    /// order or any other stable ordering.
    #[default]
    Sequential,
    /// Deliver to all matching targets concurrently.
    Parallel,
}

/// What happens to registered stop hooks after a `stop()` call.
///
/// The legacy contract retains hooks, so a second `stop()` re-runs every
/// hook. Whether that is intended idempotent cleanup or an oversight is
/// undecided upstream, so both behaviors are available here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopHookPolicy {
    /// Keep hooks registered after running them; every `stop()` call runs
    /// the full list again (legacy behavior, the default).
    #[default]
    Retain,
    /// Drain the hook list after running it; a later `stop()` only runs
    /// hooks registered since the previous call.
    ClearAfterRun,
}

/// Configuration for a single [`RuleNode`](crate::RuleNode).
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeConfig {
    /// Fan-out policy for edges and event handlers.
    pub concurrency: ConcurrencyMode,
    /// Stop-hook retention policy.
    pub stop_hooks: StopHookPolicy,
}
