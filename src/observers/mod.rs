//! # Global observers.
//!
//! A global observer receives **every** event fired by the node it is
//! registered on, independent of event name — the observability half of the
//! event channel, next to the per-name handler nodes.
//!
//! Observers are notified synchronously and in registration order, so the
//! observability path never races with itself.

mod log;
mod observer;

pub use log::LogObserver;
pub use observer::GlobalObserver;
