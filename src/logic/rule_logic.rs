//! # The logic boundary trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::node::ExecutionContext;

/// Shared handle to a logic unit.
pub type LogicRef = Arc<dyn RuleLogic>;

/// # The opaque unit of computation a [`RuleNode`](crate::RuleNode) wraps.
///
/// [`start`](RuleLogic::start) is invoked once per lifecycle, when the node
/// transitions from Stopped to Running. The logic should register its input
/// consumer through [`ExecutionContext::accept`](crate::ExecutionContext::accept)
/// during (or after) this call; until it does, items delivered to the node
/// are silently dropped.
///
/// Long-running logic should watch
/// [`ExecutionContext::cancellation`](crate::ExecutionContext::cancellation)
/// and wind down when the owning node stops.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use rulevisor::{ExecutionContext, RuleLogic};
///
/// struct Passthrough;
///
/// #[async_trait]
/// impl RuleLogic for Passthrough {
///     async fn start(&self, ctx: ExecutionContext) {
///         let out = ctx.clone();
///         ctx.accept(move |data| {
///             let out = out.clone();
///             async move { out.emit(data).await }
///         });
///     }
/// }
/// ```
#[async_trait]
pub trait RuleLogic: Send + Sync + 'static {
    /// Called on the Stopped→Running transition with the node's context.
    async fn start(&self, ctx: ExecutionContext);
}
