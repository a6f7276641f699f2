//! # Data items flowing through the rule graph.
//!
//! [`RuleData`] is the unit of traffic between nodes: an opaque payload plus
//! a mutable attribute map. The core never interprets the payload; it only
//! stamps attributes (event names, error details) as items move through
//! nodes, edges, and the event channel.

mod item;

pub use item::{
    RuleData, ERROR_ATTRIBUTE, ERROR_MESSAGE_ATTRIBUTE, ERROR_TYPE_ATTRIBUTE, EVENT_ATTRIBUTE,
};
