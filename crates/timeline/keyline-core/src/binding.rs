//! Live property bindings.
//!
//! Keyframing is opt-in per property: when a property has no keyframes the
//! sampler asks the host for the object's current value through
//! `LiveProperties`. Adapters implement the trait over their scene graph;
//! `LiveValues` is a plain table for tests and headless hosts.

use hashbrown::HashMap;

use crate::ids::ObjectId;
use crate::value::{Property, Value};

/// Resolves the current (un-animated) value of an object's property.
pub trait LiveProperties {
    fn live_value(&self, object: &ObjectId, property: Property) -> Option<Value>;
}

/// No live values; unkeyed properties sample to `None`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLiveValues;

impl LiveProperties for NoLiveValues {
    fn live_value(&self, _object: &ObjectId, _property: Property) -> Option<Value> {
        None
    }
}

/// In-memory table of live values keyed by (object, property).
#[derive(Debug, Default, Clone)]
pub struct LiveValues {
    rows: HashMap<(ObjectId, Property), Value>,
}

impl LiveValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the live value for one property.
    pub fn set(&mut self, object: ObjectId, property: Property, value: Value) {
        self.rows.insert((object, property), value);
    }

    pub fn remove_object(&mut self, object: &ObjectId) {
        self.rows.retain(|(o, _), _| o != object);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LiveProperties for LiveValues {
    fn live_value(&self, object: &ObjectId, property: Property) -> Option<Value> {
        self.rows.get(&(object.clone(), property)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_values_upsert_and_remove() {
        let mut live = LiveValues::new();
        let obj = ObjectId::new("box");
        live.set(obj.clone(), Property::Opacity, Value::Number(0.5));
        live.set(obj.clone(), Property::Opacity, Value::Number(0.75));
        assert_eq!(
            live.live_value(&obj, Property::Opacity),
            Some(Value::Number(0.75))
        );
        assert_eq!(live.len(), 1);
        live.remove_object(&obj);
        assert!(live.is_empty());
    }
}
