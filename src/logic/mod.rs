//! # Node logic: the opaque unit a node executes.
//!
//! This module defines the [`RuleLogic`] boundary trait and a closure-backed
//! implementation, [`LogicFn`]. The shared handle type is [`LogicRef`], an
//! `Arc<dyn RuleLogic>`.
//!
//! Logic interacts with its node exclusively through the
//! [`ExecutionContext`](crate::ExecutionContext) it receives at start:
//! registering the input consumer, emitting output, firing events, reporting
//! errors, and registering stop hooks.

mod logic_fn;
mod rule_logic;

pub use logic_fn::LogicFn;
pub use rule_logic::{LogicRef, RuleLogic};
