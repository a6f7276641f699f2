//! # Closure-backed logic (`LogicFn`)
//!
//! [`LogicFn`] wraps a closure `F: Fn(ExecutionContext) -> Fut`, producing a
//! fresh start future per lifecycle. State shared across restarts must be
//! captured explicitly (`Arc<...>`) inside the closure.
//!
//! ## Example
//! ```
//! use rulevisor::{ExecutionContext, LogicFn, LogicRef};
//!
//! let logic: LogicRef = LogicFn::arc(|ctx: ExecutionContext| async move {
//!     let out = ctx.clone();
//!     ctx.accept(move |data| {
//!         let out = out.clone();
//!         async move { out.emit(data).await }
//!     });
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::logic::RuleLogic;
use crate::node::ExecutionContext;

/// Closure-backed [`RuleLogic`] implementation.
#[derive(Debug)]
pub struct LogicFn<F> {
    f: F,
}

impl<F> LogicFn<F> {
    /// Creates a new closure-backed logic unit.
    ///
    /// Prefer [`LogicFn::arc`] when you immediately need a [`LogicRef`](crate::LogicRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the logic and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> RuleLogic for LogicFn<F>
where
    F: Fn(ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn start(&self, ctx: ExecutionContext) {
        (self.f)(ctx).await;
    }
}
