//! Output contracts for the rendering collaborator.
//!
//! Outputs carry the sampled property values for the current clock time,
//! keyed by object and property, and a separate list of playback events.
//! The host paints the changes and reflects the events (transport buttons).

use serde::{Deserialize, Serialize};

use crate::ids::{AnimationId, ObjectId};
use crate::value::{Property, Value};

/// One sampled property value for an animated object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub object: ObjectId,
    pub animation: AnimationId,
    pub property: Property,
    pub value: Value,
}

/// Discrete playback-state notifications.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlaybackEvent {
    Playing,
    Paused,
    Stopped,
    Seeked { time: f32 },
}

/// Outputs returned by `Timeline::frame()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    /// Clock time the changes were sampled at.
    pub time: f32,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<PlaybackEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: PlaybackEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Sampled value for one object/property, if present.
    pub fn value_of(&self, object: &ObjectId, property: Property) -> Option<Value> {
        self.changes
            .iter()
            .find(|c| &c.object == object && c.property == property)
            .map(|c| c.value)
    }
}
