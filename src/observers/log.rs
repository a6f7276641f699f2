//! # Built-in logging observer.
//!
//! [`LogObserver`] renders every node event through `tracing`. Intended as a
//! demo/reference sink; production deployments usually register their own
//! observers for metrics or audit trails.

use async_trait::async_trait;

use crate::events::NodeEvent;
use crate::observers::GlobalObserver;

/// Logs every observed event via `tracing`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GlobalObserver for LogObserver {
    async fn on_event(&self, event: &NodeEvent) {
        if event.is_failure() {
            tracing::warn!(
                seq = event.seq,
                node_id = %event.node_id,
                instance_id = %event.instance_id,
                event = %event.event,
                data_id = %event.data.id(),
                "node reported failure"
            );
        } else {
            tracing::info!(
                seq = event.seq,
                node_id = %event.node_id,
                instance_id = %event.instance_id,
                event = %event.event,
                data_id = %event.data.id(),
                "node event"
            );
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
