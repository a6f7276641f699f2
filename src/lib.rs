//! # rulevisor
//!
//! **Rulevisor** is a lightweight execution core for directed rule graphs.
//!
//! It provides a single building block — the [`RuleNode`] — that wraps an
//! opaque unit of node logic, manages its lifecycle, routes its output to
//! downstream nodes under per-edge predicates, and distributes
//! lifecycle/business events to registered observers. Graph assembly,
//! rule-definition parsing, and persistence live in higher layers.
//!
//! ## Architecture
//! ```text
//!            execute(d)
//! caller ───────────────► RuleNode ["transform"]
//!                         ├─ RuleLogic (opaque; registers the input consumer)
//!                         ├─ ExecutionContext (accept / emit / fire_event /
//!                         │                    report_error / on_stop)
//!                         ├─ edges: [(predicate, target), ...]
//!                         └─ EventRegistry
//!                              ├─ handlers: event name → [RuleNode, ...]
//!                              └─ observers: [GlobalObserver, ...]
//!
//! ctx.emit(out):
//!     every edge predicate is evaluated against `out`;
//!     each matching target's execute() is awaited
//!     (Sequential: one at a time; Parallel: concurrently).
//!
//! ctx.fire_event(name, d):
//!     d' = copy of d with attribute event = name  (d untouched)
//!     ├─► every GlobalObserver, awaited in registration order
//!     └─► handlers[name], per ConcurrencyMode
//!
//! ctx.report_error(d, e):
//!     d.error/error_type/error_message ◄─ e
//!     fire_event("node_execute_fail", d)
//! ```
//!
//! ## Delivery contract
//! - `execute` returns the input item after handing it to the consumer; the
//!   return acknowledges **receipt, not completion** of processing.
//! - No guaranteed delivery, no bounded queues, no retries: forwarding awaits
//!   the downstream node, so slow consumers backpressure their upstream
//!   through the call chain.
//! - Failures never cross the node boundary as errors; they surface as data
//!   attributes plus the reserved [`events::NODE_EXECUTE_FAIL`] event.
//!
//! ## Example
//! ```rust
//! use rulevisor::{ExecutionContext, LogicFn, RuleData, RuleNode};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // A node that forwards every input straight to its output edges.
//!     let relay = RuleNode::new(
//!         "instance-1",
//!         "relay",
//!         LogicFn::arc(|ctx: ExecutionContext| async move {
//!             let out = ctx.clone();
//!             ctx.accept(move |data| {
//!                 let out = out.clone();
//!                 async move { out.emit(data).await }
//!             });
//!         }),
//!     );
//!
//!     // A terminal node that just acknowledges receipt.
//!     let sink = RuleNode::new(
//!         "instance-1",
//!         "sink",
//!         LogicFn::arc(|ctx: ExecutionContext| async move {
//!             ctx.accept(|data: RuleData| async move {
//!                 println!("sink got {}", data.payload());
//!             });
//!         }),
//!     );
//!
//!     // Only items with level >= 3 reach the sink.
//!     relay.add_next(
//!         |d: &RuleData| d.payload()["level"].as_i64().unwrap_or(0) >= 3,
//!         sink.clone(),
//!     );
//!
//!     relay.start().await;
//!     sink.start().await;
//!
//!     relay.execute(RuleData::new(json!({"level": 5}))).await;
//!     relay.execute(RuleData::new(json!({"level": 1}))).await; // filtered out
//!
//!     relay.stop().await;
//!     sink.stop().await;
//! }
//! ```

mod config;
pub mod data;
mod error;
pub mod events;
mod logic;
mod node;
pub mod observers;

// ---- Public re-exports ----

pub use config::{ConcurrencyMode, NodeConfig, StopHookPolicy};
pub use data::RuleData;
pub use error::LogicError;
pub use events::{EventRegistry, NodeEvent};
pub use logic::{LogicFn, LogicRef, RuleLogic};
pub use node::{Edge, ExecutionContext, NodeBuilder, Predicate, RuleNode};
pub use observers::{GlobalObserver, LogObserver};
