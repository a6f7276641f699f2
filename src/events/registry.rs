//! # Per-node event registry.
//!
//! [`EventRegistry`] maps event names to ordered handler-node lists and keeps
//! the separate list of global observers. Both collections are append-only;
//! there is no removal API.
//!
//! ## Rules
//! - Handler lists are created on first registration for a name.
//! - The handler map is expected to be fully populated during graph assembly,
//!   before runtime traffic; appending while a dispatch is in flight is not
//!   guaranteed to be visible to that dispatch.
//! - The observer list tolerates concurrent append during broadcast:
//!   iteration works on a snapshot, so a late append never panics and newly
//!   added observers simply miss in-flight broadcasts.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::node::RuleNode;
use crate::observers::GlobalObserver;

/// Event-name → handler-nodes mapping plus the global observer list.
#[derive(Default)]
pub struct EventRegistry {
    handlers: RwLock<HashMap<Arc<str>, Vec<RuleNode>>>,
    observers: RwLock<Vec<Arc<dyn GlobalObserver>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the list for `event`, creating the entry if absent.
    pub fn add_handler(&self, event: impl Into<Arc<str>>, handler: RuleNode) {
        self.handlers
            .write()
            .unwrap()
            .entry(event.into())
            .or_default()
            .push(handler);
    }

    /// Appends a global observer.
    pub fn add_observer(&self, observer: Arc<dyn GlobalObserver>) {
        self.observers.write().unwrap().push(observer);
    }

    /// Returns a snapshot of the handlers registered for `event`.
    ///
    /// Cloning out of the lock keeps dispatch free of any guard, so handler
    /// `execute` calls can be awaited safely.
    pub fn handlers_for(&self, event: &str) -> Vec<RuleNode> {
        self.handlers
            .read()
            .unwrap()
            .get(event)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a snapshot of the global observers, in registration order.
    pub fn observers(&self) -> Vec<Arc<dyn GlobalObserver>> {
        self.observers.read().unwrap().clone()
    }

    /// Number of registered global observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().unwrap().len()
    }
}
