//! # RuleNode: lifecycle, input delivery, fan-out, and event broadcasting.
//!
//! ## Rules
//! - `start`/`stop` serialize on one async mutex; a `start` while Running is
//!   silently absorbed (not an error), so N concurrent starts invoke the
//!   logic's start routine exactly once.
//! - `execute` hands the item to the registered input consumer and returns
//!   the same item. The return value acknowledges **receipt, not
//!   completion**: it is decoupled from the logic's processing outcome and
//!   from any downstream delivery. With no consumer registered the delivery
//!   is silently dropped.
//! - Output emission evaluates every edge predicate; every matching edge
//!   forwards to its target's `execute`, sequentially or concurrently per
//!   [`ConcurrencyMode`]. Traversal order is unspecified either way.
//! - Events broadcast a structural copy of the item: observers first
//!   (sequential, registration order), then the handlers registered for the
//!   event name (per concurrency mode).
//! - Edges and handlers are registered during graph assembly; registering
//!   while traffic is in flight is memory-safe here but gives no visibility
//!   guarantee to in-flight traversals. The observer list explicitly
//!   tolerates append during broadcast.
//! - Forwarding awaits the downstream `execute`, so a slow node
//!   backpressures its upstream through the call chain. There are no queues,
//!   timeouts, or delivery cancellation in this core; bounded queues belong
//!   in a layer above it.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, RwLock};

use futures::future::BoxFuture;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{ConcurrencyMode, NodeConfig};
use crate::data::{RuleData, EVENT_ATTRIBUTE};
use crate::error::LogicError;
use crate::events::{EventRegistry, NodeEvent, NODE_EXECUTE_FAIL};
use crate::logic::LogicRef;
use crate::node::builder::NodeBuilder;
use crate::node::context::ExecutionContext;
use crate::node::edge::Edge;
use crate::observers::GlobalObserver;

/// Single-slot input consumer registered by logic (last writer wins).
pub(crate) type Consumer = Arc<dyn Fn(RuleData) -> BoxFuture<'static, ()> + Send + Sync>;

/// Stop hook registered through [`ExecutionContext::on_stop`].
pub(crate) type StopHook = Arc<dyn Fn() + Send + Sync>;

/// State shared between a node's handles and its execution context.
pub(crate) struct NodeInner {
    pub(crate) instance_id: Arc<str>,
    pub(crate) node_id: Arc<str>,
    pub(crate) span: tracing::Span,
    logic: LogicRef,
    config: NodeConfig,

    /// Serializes start/stop transitions.
    lifecycle: tokio::sync::Mutex<()>,
    running: AtomicBool,
    /// Cancelled on stop; replaced with a fresh token on each start.
    pub(crate) shutdown: RwLock<CancellationToken>,

    pub(crate) consumer: RwLock<Option<Consumer>>,
    edges: RwLock<Vec<Edge>>,
    registry: EventRegistry,
    pub(crate) stop_hooks: Mutex<Vec<StopHook>>,
}

/// An executable unit in the rule graph.
///
/// Owns a logic unit, a predicate-gated edge set, an event registry, and
/// lifecycle state. `RuleNode` is a cheap `Clone` handle (internally
/// `Arc`-shared), so edges, handler lists, and callers can all hold the same
/// node.
///
/// ## Example
/// ```no_run
/// use rulevisor::{ExecutionContext, LogicFn, RuleData, RuleNode};
/// use serde_json::json;
///
/// # async fn demo() {
/// let node = RuleNode::builder(
///     "instance-1",
///     "doubler",
///     LogicFn::arc(|ctx: ExecutionContext| async move {
///         let out = ctx.clone();
///         ctx.accept(move |data| {
///             let out = out.clone();
///             async move { out.emit(data).await }
///         });
///     }),
/// )
/// .build();
///
/// node.start().await;
/// node.execute(RuleData::new(json!(21))).await;
/// node.stop().await;
/// # }
/// ```
#[derive(Clone)]
pub struct RuleNode {
    inner: Arc<NodeInner>,
}

impl RuleNode {
    /// Creates a node with the default configuration.
    pub fn new(
        instance_id: impl Into<Arc<str>>,
        node_id: impl Into<Arc<str>>,
        logic: LogicRef,
    ) -> Self {
        Self::builder(instance_id, node_id, logic).build()
    }

    /// Returns a [`NodeBuilder`] for configuring the node.
    pub fn builder(
        instance_id: impl Into<Arc<str>>,
        node_id: impl Into<Arc<str>>,
        logic: LogicRef,
    ) -> NodeBuilder {
        NodeBuilder::new(instance_id, node_id, logic)
    }

    pub(crate) fn from_parts(
        instance_id: Arc<str>,
        node_id: Arc<str>,
        logic: LogicRef,
        config: NodeConfig,
    ) -> Self {
        let span = tracing::info_span!(
            "rule_node",
            instance_id = %instance_id,
            node_id = %node_id,
        );
        Self {
            inner: Arc::new(NodeInner {
                instance_id,
                node_id,
                span,
                logic,
                config,
                lifecycle: tokio::sync::Mutex::new(()),
                running: AtomicBool::new(false),
                shutdown: RwLock::new(CancellationToken::new()),
                consumer: RwLock::new(None),
                edges: RwLock::new(Vec::new()),
                registry: EventRegistry::new(),
                stop_hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Graph instance this node belongs to.
    pub fn instance_id(&self) -> &str {
        &self.inner.instance_id
    }

    /// Identity of this node within the graph.
    pub fn node_id(&self) -> &str {
        &self.inner.node_id
    }

    /// True while the node is in the Running state.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(AtomicOrdering::Acquire)
    }

    /// Transitions Stopped→Running and invokes the logic's start routine.
    ///
    /// Idempotent: a call while already Running is a no-op, and concurrent
    /// calls serialize, so the logic's start routine runs at most once per
    /// lifecycle. The logic receives a fresh [`ExecutionContext`] and a fresh
    /// cancellation token.
    pub async fn start(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        if self.inner.running.load(AtomicOrdering::Acquire) {
            return;
        }
        self.inner.running.store(true, AtomicOrdering::Release);
        *self.inner.shutdown.write().unwrap() = CancellationToken::new();

        tracing::debug!(parent: &self.inner.span, "node starting");
        let ctx = ExecutionContext::new(Arc::clone(&self.inner));
        self.inner.logic.start(ctx).await;
    }

    /// Runs every registered stop hook and transitions to Stopped.
    ///
    /// Hooks run in registration order, exactly once per call; the node ends
    /// up Stopped regardless of what the hooks do. Under
    /// [`StopHookPolicy::Retain`](crate::StopHookPolicy::Retain) (the
    /// default) hooks stay registered and a later `stop()` runs them again;
    /// [`StopHookPolicy::ClearAfterRun`](crate::StopHookPolicy::ClearAfterRun)
    /// drains the list instead. The lifecycle cancellation token is cancelled
    /// before the hooks run.
    pub async fn stop(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;
        tracing::debug!(parent: &self.inner.span, "node stopping");
        self.inner.shutdown.read().unwrap().cancel();
        self.inner.run_stop_hooks();
        self.inner.running.store(false, AtomicOrdering::Release);
    }

    /// Delivers `data` to the registered input consumer and returns the item.
    ///
    /// The returned item acknowledges **receipt only** — it is the input item
    /// handed back unchanged, resolved independently of the logic's
    /// processing outcome and of any downstream delivery the logic may
    /// trigger later. Callers must not treat it as a processing
    /// acknowledgment. With no consumer registered the delivery is silently
    /// dropped and the item is still returned.
    pub async fn execute(&self, data: RuleData) -> RuleData {
        let consumer = self.inner.consumer.read().unwrap().clone();
        match consumer {
            Some(consumer) => consumer(data.clone()).await,
            None => {
                tracing::trace!(
                    parent: &self.inner.span,
                    data_id = %data.id(),
                    "no input consumer registered, dropping delivery"
                );
            }
        }
        data
    }

    /// Fires a named event carrying a structural copy of `data`.
    ///
    /// See [`ExecutionContext::fire_event`] for the broadcast contract.
    pub async fn fire_event(&self, event: impl Into<Arc<str>>, data: &RuleData) {
        self.inner.fire_event(event.into(), data).await;
    }

    /// Converts a logic failure into attributes plus the reserved
    /// [`NODE_EXECUTE_FAIL`] event.
    ///
    /// See [`ExecutionContext::report_error`].
    pub async fn report_error(&self, data: RuleData, err: &LogicError) {
        self.inner.report_error(data, err).await;
    }

    /// Appends a predicate-gated edge to `target`.
    ///
    /// Safe only during graph assembly: appending while traffic traverses the
    /// edge set gives no visibility guarantee to in-flight fan-outs.
    pub fn add_next<P>(&self, condition: P, target: RuleNode)
    where
        P: Fn(&RuleData) -> bool + Send + Sync + 'static,
    {
        self.inner
            .edges
            .write()
            .unwrap()
            .push(Edge::new(Arc::new(condition), target));
    }

    /// Registers `handler` for events named `event`, creating the handler
    /// list if absent. Graph-assembly-time operation, like
    /// [`add_next`](Self::add_next).
    pub fn add_event_handler(&self, event: impl Into<Arc<str>>, handler: RuleNode) {
        self.inner.registry.add_handler(event, handler);
    }

    /// Appends a global observer receiving every event this node fires.
    ///
    /// Unlike the structural registrations, this is safe to call while a
    /// broadcast is in flight; the new observer joins from the next
    /// broadcast on.
    pub fn add_observer(&self, observer: Arc<dyn GlobalObserver>) {
        self.inner.registry.add_observer(observer);
    }
}

impl std::fmt::Debug for RuleNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleNode")
            .field("instance_id", &self.instance_id())
            .field("node_id", &self.node_id())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl NodeInner {
    /// Fan-out: forward `data` to every edge whose predicate matches.
    pub(crate) async fn dispatch(&self, data: RuleData) {
        let targets: Vec<RuleNode> = {
            let edges = self.edges.read().unwrap();
            edges
                .iter()
                .filter(|edge| edge.matches(&data))
                .map(|edge| edge.target().clone())
                .collect()
        };
        self.fan_out(targets, data).await;
    }

    pub(crate) async fn fire_event(&self, event: Arc<str>, data: &RuleData) {
        let mut copy = data.clone();
        tracing::debug!(
            parent: &self.span,
            event = %event,
            data_id = %copy.id(),
            "fire event"
        );
        copy.set_attribute(EVENT_ATTRIBUTE, Value::String(event.to_string()));
        self.broadcast(event, copy).await;
    }

    pub(crate) async fn report_error(&self, mut data: RuleData, err: &LogicError) {
        tracing::error!(
            parent: &self.span,
            error = %err,
            data_id = %data.id(),
            "node execution failed"
        );
        data.put_error(err);
        self.fire_event(Arc::from(NODE_EXECUTE_FAIL), &data).await;
    }

    /// Observers first (sequential, registration order), then named handlers
    /// (per concurrency mode). `data` is the already-stamped broadcast copy.
    async fn broadcast(&self, event: Arc<str>, data: RuleData) {
        let envelope = NodeEvent::new(
            Arc::clone(&self.instance_id),
            Arc::clone(&self.node_id),
            Arc::clone(&event),
            data.clone(),
        );
        for observer in self.registry.observers() {
            observer.on_event(&envelope).await;
        }

        let handlers = self.registry.handlers_for(&event);
        if !handlers.is_empty() {
            self.fan_out(handlers, data).await;
        }
    }

    /// Delivers `data` to each target, awaiting per the configured mode.
    /// Each target gets its own copy (independent attributes, shared payload).
    async fn fan_out(&self, targets: Vec<RuleNode>, data: RuleData) {
        match self.config.concurrency {
            ConcurrencyMode::Sequential => {
                for target in targets {
                    target.execute(data.clone()).await;
                }
            }
            ConcurrencyMode::Parallel => {
                let deliveries = targets.into_iter().map(|target| {
                    let item = data.clone();
                    async move {
                        target.execute(item).await;
                    }
                });
                futures::future::join_all(deliveries).await;
            }
        }
    }

    fn run_stop_hooks(&self) {
        // Snapshot before running so a hook registering another hook cannot
        // deadlock on the list.
        let hooks: Vec<StopHook> = match self.config.stop_hooks {
            crate::config::StopHookPolicy::Retain => self.stop_hooks.lock().unwrap().clone(),
            crate::config::StopHookPolicy::ClearAfterRun => {
                std::mem::take(&mut *self.stop_hooks.lock().unwrap())
            }
        };
        for hook in hooks {
            hook();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StopHookPolicy;
    use crate::logic::LogicFn;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Node whose logic records every delivered item.
    fn sink_node(node_id: &str, received: Arc<Mutex<Vec<RuleData>>>) -> RuleNode {
        RuleNode::builder(
            "test-instance",
            node_id,
            LogicFn::arc(move |ctx: ExecutionContext| {
                let received = Arc::clone(&received);
                async move {
                    ctx.accept(move |data| {
                        let received = Arc::clone(&received);
                        async move {
                            received.lock().unwrap().push(data);
                        }
                    });
                }
            }),
        )
        .build()
    }

    /// Node whose logic counts deliveries.
    fn counter_node(node_id: &str, hits: Arc<AtomicUsize>) -> RuleNode {
        RuleNode::builder(
            "test-instance",
            node_id,
            LogicFn::arc(move |ctx: ExecutionContext| {
                let hits = Arc::clone(&hits);
                async move {
                    ctx.accept(move |_data| {
                        let hits = Arc::clone(&hits);
                        async move {
                            hits.fetch_add(1, AtomicOrdering::SeqCst);
                        }
                    });
                }
            }),
        )
        .build()
    }

    /// Node whose logic forwards every input straight to its output.
    fn passthrough_node(node_id: &str, mode: ConcurrencyMode) -> RuleNode {
        RuleNode::builder(
            "test-instance",
            node_id,
            LogicFn::arc(|ctx: ExecutionContext| async move {
                let out = ctx.clone();
                ctx.accept(move |data| {
                    let out = out.clone();
                    async move { out.emit(data).await }
                });
            }),
        )
        .concurrency(mode)
        .build()
    }

    /// Observer recording every envelope it sees.
    struct Recorder {
        events: Arc<Mutex<Vec<NodeEvent>>>,
    }

    #[async_trait::async_trait]
    impl GlobalObserver for Recorder {
        async fn on_event(&self, event: &NodeEvent) {
            self.events.lock().unwrap().push(event.clone());
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test]
    async fn test_concurrent_start_invokes_logic_once() {
        let starts = Arc::new(AtomicUsize::new(0));
        let node = {
            let starts = Arc::clone(&starts);
            RuleNode::new(
                "test-instance",
                "once",
                LogicFn::arc(move |_ctx: ExecutionContext| {
                    let starts = Arc::clone(&starts);
                    async move {
                        starts.fetch_add(1, AtomicOrdering::SeqCst);
                    }
                }),
            )
        };

        let mut joins = Vec::new();
        for _ in 0..8 {
            let node = node.clone();
            joins.push(tokio::spawn(async move { node.start().await }));
        }
        for join in joins {
            join.await.unwrap();
        }
        node.start().await;

        assert_eq!(starts.load(AtomicOrdering::SeqCst), 1);
        assert!(node.is_running());
    }

    #[tokio::test]
    async fn test_stop_hooks_rerun_when_retained() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let node = {
            let order = Arc::clone(&order);
            RuleNode::new(
                "test-instance",
                "hooks",
                LogicFn::arc(move |ctx: ExecutionContext| {
                    let order = Arc::clone(&order);
                    async move {
                        let first = Arc::clone(&order);
                        ctx.on_stop(move || first.lock().unwrap().push("first"));
                        let second = Arc::clone(&order);
                        ctx.on_stop(move || second.lock().unwrap().push("second"));
                    }
                }),
            )
        };

        node.start().await;
        node.stop().await;
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        assert!(!node.is_running());

        // Retain is the default: a second stop runs the full list again.
        node.stop().await;
        assert_eq!(
            *order.lock().unwrap(),
            vec!["first", "second", "first", "second"]
        );
    }

    #[tokio::test]
    async fn test_stop_hooks_drained_when_policy_clears() {
        let runs = Arc::new(AtomicUsize::new(0));
        let node = {
            let runs = Arc::clone(&runs);
            RuleNode::builder(
                "test-instance",
                "hooks-clear",
                LogicFn::arc(move |ctx: ExecutionContext| {
                    let runs = Arc::clone(&runs);
                    async move {
                        ctx.on_stop(move || {
                            runs.fetch_add(1, AtomicOrdering::SeqCst);
                        });
                    }
                }),
            )
            .stop_hooks(StopHookPolicy::ClearAfterRun)
            .build()
        };

        node.start().await;
        node.stop().await;
        node.stop().await;

        assert_eq!(runs.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_cancels_lifecycle_token() {
        let token_slot = Arc::new(Mutex::new(None));
        let node = {
            let token_slot = Arc::clone(&token_slot);
            RuleNode::new(
                "test-instance",
                "cancel",
                LogicFn::arc(move |ctx: ExecutionContext| {
                    let token_slot = Arc::clone(&token_slot);
                    async move {
                        *token_slot.lock().unwrap() = Some(ctx.cancellation());
                    }
                }),
            )
        };

        node.start().await;
        let token = token_slot.lock().unwrap().clone().unwrap();
        assert!(!token.is_cancelled());

        node.stop().await;
        assert!(token.is_cancelled());
    }

    async fn gating_case(mode: ConcurrencyMode) {
        let matched = Arc::new(Mutex::new(Vec::new()));
        let unmatched = Arc::new(Mutex::new(Vec::new()));

        let source = passthrough_node("source", mode);
        let yes = sink_node("yes", Arc::clone(&matched));
        let no = sink_node("no", Arc::clone(&unmatched));

        source.add_next(|_: &RuleData| true, yes.clone());
        source.add_next(|_: &RuleData| false, no.clone());

        source.start().await;
        yes.start().await;
        no.start().await;

        source.execute(RuleData::new(json!({"v": 1}))).await;

        assert_eq!(matched.lock().unwrap().len(), 1);
        assert!(unmatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_predicate_gating_sequential() {
        gating_case(ConcurrencyMode::Sequential).await;
    }

    #[tokio::test]
    async fn test_predicate_gating_parallel() {
        gating_case(ConcurrencyMode::Parallel).await;
    }

    async fn fan_out_case(mode: ConcurrencyMode) {
        let hits = Arc::new(AtomicUsize::new(0));
        let source = passthrough_node("source", mode);

        // Four edges, predicates matching exactly two of them.
        for (node_id, wanted) in [("t0", 0), ("t1", 1), ("t2", 0), ("t3", 1)] {
            let sink = counter_node(node_id, Arc::clone(&hits));
            sink.start().await;
            source.add_next(
                move |d: &RuleData| d.payload() == &json!(wanted),
                sink.clone(),
            );
        }
        source.start().await;

        source.execute(RuleData::new(json!(1))).await;

        // Membership/count only; parallel mode gives no ordering.
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fan_out_count_sequential() {
        fan_out_case(ConcurrencyMode::Sequential).await;
    }

    #[tokio::test]
    async fn test_fan_out_count_parallel() {
        fan_out_case(ConcurrencyMode::Parallel).await;
    }

    #[tokio::test]
    async fn test_execute_without_consumer_is_silent_drop() {
        let hits = Arc::new(AtomicUsize::new(0));
        // Logic that never registers a consumer.
        let node = RuleNode::new(
            "test-instance",
            "no-consumer",
            LogicFn::arc(|_ctx: ExecutionContext| async {}),
        );
        let sink = counter_node("sink", Arc::clone(&hits));
        sink.start().await;
        node.add_next(|_: &RuleData| true, sink.clone());
        node.start().await;

        let input = RuleData::new(json!("ping"));
        let input_id = input.id().to_string();
        let returned = node.execute(input).await;

        assert_eq!(returned.id(), input_id);
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_execute_returns_input_item_unchanged() {
        let source = passthrough_node("source", ConcurrencyMode::Sequential);
        source.start().await;

        let mut input = RuleData::new(json!({"k": "v"}));
        input.set_attribute("origin", json!("caller"));
        let input_id = input.id().to_string();

        let returned = source.execute(input).await;

        assert_eq!(returned.id(), input_id);
        assert_eq!(returned.attribute("origin"), Some(&json!("caller")));
    }

    #[tokio::test]
    async fn test_consumer_slot_is_last_writer_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let node = {
            let first = Arc::clone(&first);
            let second = Arc::clone(&second);
            RuleNode::new(
                "test-instance",
                "slot",
                LogicFn::arc(move |ctx: ExecutionContext| {
                    let first = Arc::clone(&first);
                    let second = Arc::clone(&second);
                    async move {
                        ctx.accept(move |_data| {
                            let first = Arc::clone(&first);
                            async move {
                                first.fetch_add(1, AtomicOrdering::SeqCst);
                            }
                        });
                        // Replaces the registration above, silently.
                        ctx.accept(move |_data| {
                            let second = Arc::clone(&second);
                            async move {
                                second.fetch_add(1, AtomicOrdering::SeqCst);
                            }
                        });
                    }
                }),
            )
        };

        node.start().await;
        node.execute(RuleData::new(Value::Null)).await;

        assert_eq!(first.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(second.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fire_event_copy_is_isolated_from_caller() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let node = passthrough_node("emitter", ConcurrencyMode::Sequential);
        let handler = sink_node("handler", Arc::clone(&seen));
        node.add_event_handler("measured", handler.clone());
        node.start().await;
        handler.start().await;

        let mut original = RuleData::new(json!({"celsius": 20}));
        original.set_attribute("unit", json!("C"));
        node.fire_event("measured", &original).await;

        // Handler copy carries the event stamp; the original does not.
        let mut received = seen.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].attribute(EVENT_ATTRIBUTE),
            Some(&json!("measured"))
        );
        assert!(original.attribute(EVENT_ATTRIBUTE).is_none());

        // Mutating the handler's copy is invisible to the caller.
        received[0].set_attribute("unit", json!("K"));
        assert_eq!(original.attribute("unit"), Some(&json!("C")));
    }

    #[tokio::test]
    async fn test_handlers_keyed_by_event_name() {
        let on_a = Arc::new(Mutex::new(Vec::new()));
        let all = Arc::new(Mutex::new(Vec::new()));

        let node = passthrough_node("emitter", ConcurrencyMode::Sequential);
        let handler = sink_node("handler-a", Arc::clone(&on_a));
        node.add_event_handler("a", handler.clone());
        node.add_observer(Arc::new(Recorder {
            events: Arc::clone(&all),
        }));
        node.start().await;
        handler.start().await;

        let item = RuleData::new(Value::Null);
        node.fire_event("a", &item).await;
        node.fire_event("b", &item).await;

        // Handler only sees its name; the global observer sees both.
        assert_eq!(on_a.lock().unwrap().len(), 1);
        let observed: Vec<String> = all
            .lock()
            .unwrap()
            .iter()
            .map(|ev| ev.event.to_string())
            .collect();
        assert_eq!(observed, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_error_routes_through_event_channel() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let handled = Arc::new(Mutex::new(Vec::new()));

        let node = passthrough_node("failing", ConcurrencyMode::Sequential);
        let dead_letter = sink_node("dead-letter", Arc::clone(&handled));
        node.add_observer(Arc::new(Recorder {
            events: Arc::clone(&events),
        }));
        node.add_event_handler(NODE_EXECUTE_FAIL, dead_letter.clone());
        node.start().await;
        dead_letter.start().await;

        let item = RuleData::new(json!({"job": 7}));
        node.report_error(item.clone(), &LogicError::fail("boom"))
            .await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_failure());
        assert!(events[0].data.has_error());
        assert_eq!(
            events[0].data.attribute(crate::data::ERROR_MESSAGE_ATTRIBUTE),
            Some(&json!("execution failed: boom"))
        );

        // The same copy reached the registered failure handler.
        let handled = handled.lock().unwrap();
        assert_eq!(handled.len(), 1);
        assert!(handled[0].has_error());

        // The caller's item is untouched.
        assert!(!item.has_error());
    }

    /// Observer that appends another observer to its own node mid-broadcast.
    struct SelfAppender {
        node: Mutex<Option<RuleNode>>,
        appended: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl GlobalObserver for SelfAppender {
        async fn on_event(&self, _event: &NodeEvent) {
            if let Some(node) = self.node.lock().unwrap().take() {
                let appended = Arc::clone(&self.appended);
                node.add_observer(Arc::new(Recorder {
                    events: Arc::new(Mutex::new(Vec::new())),
                }));
                appended.fetch_add(1, AtomicOrdering::SeqCst);
            }
        }

        fn name(&self) -> &'static str {
            "self-appender"
        }
    }

    #[tokio::test]
    async fn test_observer_append_during_broadcast_does_not_panic() {
        let appended = Arc::new(AtomicUsize::new(0));
        let node = passthrough_node("emitter", ConcurrencyMode::Sequential);
        node.add_observer(Arc::new(SelfAppender {
            node: Mutex::new(Some(node.clone())),
            appended: Arc::clone(&appended),
        }));
        node.start().await;

        node.fire_event("tick", &RuleData::new(Value::Null)).await;
        assert_eq!(appended.load(AtomicOrdering::SeqCst), 1);

        // The late observer participates from the next broadcast on.
        node.fire_event("tick", &RuleData::new(Value::Null)).await;
    }

    #[tokio::test]
    async fn test_chain_propagates_through_passthrough_nodes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let head = passthrough_node("head", ConcurrencyMode::Sequential);
        let mid = passthrough_node("mid", ConcurrencyMode::Sequential);
        let tail = sink_node("tail", Arc::clone(&seen));

        head.add_next(|_: &RuleData| true, mid.clone());
        mid.add_next(
            |d: &RuleData| d.payload().get("keep") == Some(&json!(true)),
            tail.clone(),
        );

        head.start().await;
        mid.start().await;
        tail.start().await;

        head.execute(RuleData::new(json!({"keep": true}))).await;
        head.execute(RuleData::new(json!({"keep": false}))).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].payload(), &json!({"keep": true}));
    }

    #[tokio::test]
    async fn test_parallel_fan_out_runs_targets_concurrently() {
        // Two slow consumers; concurrent delivery finishes well under the
        // serialized worst case.
        let source = passthrough_node("source", ConcurrencyMode::Parallel);
        for node_id in ["slow-a", "slow-b"] {
            let sink = RuleNode::new(
                "test-instance",
                node_id,
                LogicFn::arc(|ctx: ExecutionContext| async move {
                    ctx.accept(|_data| async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    });
                }),
            );
            sink.start().await;
            source.add_next(|_: &RuleData| true, sink.clone());
        }
        source.start().await;

        let begin = std::time::Instant::now();
        source.execute(RuleData::new(Value::Null)).await;
        assert!(begin.elapsed() < Duration::from_millis(190));
    }
}
