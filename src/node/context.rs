//! # ExecutionContext: the facade given to node logic.
//!
//! Logic never touches its [`RuleNode`](crate::RuleNode) directly; everything
//! goes through the context it receives at start. The context is a cheap
//! `Clone` handle over the node's shared state — created by the node,
//! meaningful only while that node exists, and the sole channel through which
//! logic can mutate node state.
//!
//! ## Capabilities
//! - [`accept`](ExecutionContext::accept) — register the input consumer
//!   (single slot, last writer wins)
//! - [`emit`](ExecutionContext::emit) — push an output item into edge fan-out
//! - [`fire_event`](ExecutionContext::fire_event) — broadcast a named event
//! - [`report_error`](ExecutionContext::report_error) — convert a failure
//!   into attributes + the reserved failure event
//! - [`on_stop`](ExecutionContext::on_stop) — register a stop hook
//! - [`instance_id`](ExecutionContext::instance_id) /
//!   [`node_id`](ExecutionContext::node_id) / [`span`](ExecutionContext::span) /
//!   [`cancellation`](ExecutionContext::cancellation) — read-only accessors

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::data::RuleData;
use crate::error::LogicError;
use crate::node::core::{Consumer, NodeInner};

/// Facade through which node logic talks to its owning node.
#[derive(Clone)]
pub struct ExecutionContext {
    inner: Arc<NodeInner>,
}

impl ExecutionContext {
    pub(crate) fn new(inner: Arc<NodeInner>) -> Self {
        Self { inner }
    }

    /// Registers the input consumer invoked for every item delivered through
    /// the node's `execute`.
    ///
    /// The consumer slot holds exactly one callback: registering a new one
    /// silently replaces the previous registration (last writer wins). There
    /// is no multi-consumer fan-in.
    pub fn accept<F, Fut>(&self, consumer: F)
    where
        F: Fn(RuleData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let consumer: Consumer =
            Arc::new(move |data: RuleData| -> BoxFuture<'static, ()> { Box::pin(consumer(data)) });
        *self.inner.consumer.write().unwrap() = Some(consumer);
    }

    /// Emits an output item, fanning it out across the node's matching edges.
    ///
    /// Each matching target receives its own copy of the item (independent
    /// attributes, shared payload) and is awaited per the node's
    /// [`ConcurrencyMode`](crate::ConcurrencyMode). The await covers the
    /// downstream `execute` calls, so a slow downstream node backpressures
    /// the emitter through the call chain.
    pub async fn emit(&self, data: RuleData) {
        self.inner.dispatch(data).await;
    }

    /// Fires a named event.
    ///
    /// Broadcasts a structural copy of `data` (with its `event` attribute set
    /// to `event`) to the node's global observers and to the handler nodes
    /// registered for this name. The original item is untouched.
    pub async fn fire_event(&self, event: impl Into<Arc<str>>, data: &RuleData) {
        self.inner.fire_event(event.into(), data).await;
    }

    /// Reports a logic failure.
    ///
    /// Attaches error attributes to `data` and fires the reserved
    /// [`NODE_EXECUTE_FAIL`](crate::events::NODE_EXECUTE_FAIL) event carrying
    /// the failed item. Errors never escape the node boundary any other way;
    /// retry and dead-lettering are the business of registered handlers.
    pub async fn report_error(&self, data: RuleData, err: &LogicError) {
        self.inner.report_error(data, err).await;
    }

    /// Registers a hook to run when the owning node stops.
    ///
    /// Hooks run in registration order on every `stop()` call; whether they
    /// survive a call is controlled by
    /// [`StopHookPolicy`](crate::StopHookPolicy).
    pub fn on_stop<H>(&self, hook: H)
    where
        H: Fn() + Send + Sync + 'static,
    {
        self.inner.stop_hooks.lock().unwrap().push(Arc::new(hook));
    }

    /// Graph instance the owning node belongs to.
    pub fn instance_id(&self) -> &str {
        &self.inner.instance_id
    }

    /// Identity of the owning node within the graph.
    pub fn node_id(&self) -> &str {
        &self.inner.node_id
    }

    /// The node's tracing span; logic should log within it.
    pub fn span(&self) -> &tracing::Span {
        &self.inner.span
    }

    /// Token cancelled when the owning node stops.
    ///
    /// Minted fresh on every start, so logic spawned for one lifecycle does
    /// not observe a cancellation from a previous one.
    pub fn cancellation(&self) -> CancellationToken {
        self.inner.shutdown.read().unwrap().clone()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("instance_id", &self.instance_id())
            .field("node_id", &self.node_id())
            .finish_non_exhaustive()
    }
}
