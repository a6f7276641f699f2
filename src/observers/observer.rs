//! # Global observer trait.
//!
//! [`GlobalObserver`] is the extension point for plugging event sinks
//! (logging, metrics, audit, dead-lettering) into a node. Unlike handler
//! nodes, which are keyed by event name, an observer sees every event the
//! node fires.
//!
//! ## Rules
//! - Observers are awaited one at a time, in registration order, on the
//!   firing call path. A slow observer delays the firing node (and its
//!   logic); keep `on_event` fast or hand off internally.
//! - Observers must handle their own errors; nothing they return reaches
//!   the firing node.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use rulevisor::{GlobalObserver, NodeEvent};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl GlobalObserver for FailureCounter {
//!     async fn on_event(&self, event: &NodeEvent) {
//!         if event.is_failure() {
//!             // increment a metric, page someone, ...
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::NodeEvent;

/// Receives every event fired by the node it is registered on.
#[async_trait]
pub trait GlobalObserver: Send + Sync + 'static {
    /// Processes a single event envelope.
    ///
    /// Awaited on the firing call path; long work should be handed off.
    async fn on_event(&self, event: &NodeEvent);

    /// Returns the observer name used in logs.
    ///
    /// Prefer short, descriptive names (e.g., "metrics", "audit"). The
    /// default uses `type_name::<Self>()`, which can be verbose — override
    /// it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
