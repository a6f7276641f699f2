//! # Event envelope delivered to global observers.
//!
//! A [`NodeEvent`] annotates the broadcast copy of an item with the firing
//! node's identity and the event name, plus a global sequence number and a
//! wall-clock timestamp for observers that need to reconstruct ordering
//! across nodes.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::data::RuleData;

/// Reserved event name fired when node logic reports a failure.
///
/// See [`ExecutionContext::report_error`](crate::ExecutionContext::report_error).
pub const NODE_EXECUTE_FAIL: &str = "node_execute_fail";

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// A named event fired by a node, as seen by global observers.
///
/// - `seq`: monotonic global sequence for ordering across nodes
/// - `at`: wall-clock timestamp (for logs)
/// - `data`: the broadcast copy of the item, `event` attribute already set
#[derive(Clone, Debug)]
pub struct NodeEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Graph instance the firing node belongs to.
    pub instance_id: Arc<str>,
    /// Identity of the firing node within the graph.
    pub node_id: Arc<str>,
    /// Event name (business event or a reserved name such as
    /// [`NODE_EXECUTE_FAIL`]).
    pub event: Arc<str>,
    /// Snapshot of the item carried by the event.
    pub data: RuleData,
}

impl NodeEvent {
    /// Creates an envelope with the current timestamp and next sequence number.
    pub(crate) fn new(
        instance_id: Arc<str>,
        node_id: Arc<str>,
        event: Arc<str>,
        data: RuleData,
    ) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            instance_id,
            node_id,
            event,
            data,
        }
    }

    /// True if this envelope carries the reserved failure event.
    pub fn is_failure(&self) -> bool {
        &*self.event == NODE_EXECUTE_FAIL
    }
}
