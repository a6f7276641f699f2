//! # RuleData: payload + attributes.
//!
//! A [`RuleData`] carries an opaque JSON payload and a key/value attribute
//! map. The payload is shared between copies (`Arc`); the attribute map is
//! independent per copy, which is what makes event broadcast isolation work:
//! a handler mutating its copy can never be observed by the producer.
//!
//! ## Example
//! ```
//! use rulevisor::RuleData;
//! use serde_json::json;
//!
//! let original = RuleData::new(json!({"temperature": 21.5}));
//! let mut copy = original.clone();
//! copy.set_attribute("seen", json!(true));
//!
//! assert!(original.attribute("seen").is_none());
//! assert_eq!(copy.payload(), original.payload());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::LogicError;

/// Attribute key stamped with the event name on broadcast copies.
pub const EVENT_ATTRIBUTE: &str = "event";

/// Attribute key marking an item as failed (`true`).
pub const ERROR_ATTRIBUTE: &str = "error";

/// Attribute key carrying the stable error label (see [`LogicError::as_label`]).
pub const ERROR_TYPE_ATTRIBUTE: &str = "error_type";

/// Attribute key carrying the human-readable error message.
pub const ERROR_MESSAGE_ATTRIBUTE: &str = "error_message";

/// The payload + attribute map flowing through the graph.
///
/// ### Copy semantics
/// `Clone` is the structural copy used for broadcast: the payload `Arc` is
/// shared, the attribute map is deep-cloned. Mutating a copy's attributes is
/// never observable on the original.
///
/// ### Identity
/// Every freshly constructed item gets a v4 UUID; copies keep the id of the
/// item they were copied from, so observers can correlate broadcast copies
/// with the originating item.
#[derive(Clone, Debug)]
pub struct RuleData {
    id: Arc<str>,
    payload: Arc<Value>,
    attributes: HashMap<String, Value>,
}

impl RuleData {
    /// Creates a new item with a fresh id and an empty attribute map.
    pub fn new(payload: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string().into(),
            payload: Arc::new(payload),
            attributes: HashMap::new(),
        }
    }

    /// Returns the item id (stable across copies).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the opaque payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Sets an attribute, replacing any previous value under the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Returns the attribute stored under `key`, if any.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Returns the full attribute map.
    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Attaches failure details from `err` to this item's attributes.
    ///
    /// Sets [`ERROR_ATTRIBUTE`] to `true`, [`ERROR_TYPE_ATTRIBUTE`] to the
    /// stable label, and [`ERROR_MESSAGE_ATTRIBUTE`] to the display message.
    pub fn put_error(&mut self, err: &LogicError) {
        self.attributes
            .insert(ERROR_ATTRIBUTE.to_string(), Value::Bool(true));
        self.attributes.insert(
            ERROR_TYPE_ATTRIBUTE.to_string(),
            Value::String(err.as_label().to_string()),
        );
        self.attributes.insert(
            ERROR_MESSAGE_ATTRIBUTE.to_string(),
            Value::String(err.to_string()),
        );
    }

    /// True if [`put_error`](Self::put_error) has marked this item as failed.
    pub fn has_error(&self) -> bool {
        matches!(
            self.attributes.get(ERROR_ATTRIBUTE),
            Some(Value::Bool(true))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_copy_isolates_attributes() {
        let mut original = RuleData::new(json!({"k": 1}));
        original.set_attribute("stage", json!("ingest"));

        let mut copy = original.clone();
        copy.set_attribute("stage", json!("handled"));
        copy.set_attribute("extra", json!(42));

        assert_eq!(original.attribute("stage"), Some(&json!("ingest")));
        assert!(original.attribute("extra").is_none());
        assert_eq!(copy.attribute("stage"), Some(&json!("handled")));
    }

    #[test]
    fn test_copy_shares_payload_and_id() {
        let original = RuleData::new(json!([1, 2, 3]));
        let copy = original.clone();

        assert_eq!(copy.id(), original.id());
        assert_eq!(copy.payload(), original.payload());
    }

    #[test]
    fn test_fresh_items_get_distinct_ids() {
        let a = RuleData::new(Value::Null);
        let b = RuleData::new(Value::Null);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_set_attribute_replaces_previous_value() {
        let mut item = RuleData::new(Value::Null);
        item.set_attribute("n", json!(1));
        item.set_attribute("n", json!(2));
        assert_eq!(item.attribute("n"), Some(&json!(2)));
    }

    #[test]
    fn test_put_error_marks_item_failed() {
        let mut item = RuleData::new(Value::Null);
        assert!(!item.has_error());

        item.put_error(&LogicError::fail("boom"));

        assert!(item.has_error());
        assert_eq!(
            item.attribute(ERROR_TYPE_ATTRIBUTE),
            Some(&json!("logic_failed"))
        );
        assert_eq!(
            item.attribute(ERROR_MESSAGE_ATTRIBUTE),
            Some(&json!("execution failed: boom"))
        );
    }
}
