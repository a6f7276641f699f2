//! # The rule node: lifecycle, routing, and broadcasting.
//!
//! ```text
//! caller ── execute(d) ──► RuleNode ── consumer(d) ──► RuleLogic
//!                                                         │
//!                         ┌── ctx.emit(out) ◄─────────────┘
//!                         ▼
//!                 edge predicates ──► matching targets' execute   (§ fan-out)
//!
//!                         ┌── ctx.fire_event(name, d) / ctx.report_error(d, e)
//!                         ▼
//!                 global observers ──► handlers[name]             (§ events)
//! ```
//!
//! [`RuleNode`] is a cheap-`Clone` handle over shared state; the
//! [`ExecutionContext`] handed to logic shares the same state and is the only
//! way logic reaches back into its node.

mod builder;
mod context;
mod core;
mod edge;

pub use builder::NodeBuilder;
pub use context::ExecutionContext;
pub use core::RuleNode;
pub use edge::{Edge, Predicate};
