//! # Node events: envelope, reserved names, and per-node registry.
//!
//! Every call to `fire_event` on a node produces one [`NodeEvent`] envelope
//! delivered to the node's global observers, and one dispatch of the copied
//! item to the handlers registered for that event name.
//!
//! ```text
//! fire_event(name, d)
//!     │  d' = d.clone(); d'.set_attribute("event", name)
//!     ├────► global observers (sequential, registration order)   NodeEvent
//!     └────► handlers[name]  (per ConcurrencyMode)               d' → execute
//! ```

mod event;
mod registry;

pub use event::{NodeEvent, NODE_EXECUTE_FAIL};
pub use registry::EventRegistry;
