//! Canonical timeline data model: animations and their keyframes.
//! Property/Value are defined in value.rs.

use serde::{Deserialize, Serialize};

use crate::ids::{AnimationId, KeyframeId, ObjectId, SceneId};
use crate::interp::Ease;
use crate::value::{Property, Value};

/// Timed container of keyframes for one animated object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: AnimationId,
    pub object: ObjectId,
    #[serde(default)]
    pub scene: Option<SceneId>,
    /// Seconds, > 0.
    pub duration: f32,
    #[serde(default)]
    pub r#loop: bool,
    #[serde(default)]
    pub autoplay: bool,
    /// Multiplier applied to elapsed wall time during playback, > 0.
    pub playback_rate: f32,
    /// Ordering among the animations of the same scene.
    #[serde(default)]
    pub order: u32,
}

/// A timestamped value assignment for one property.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe {
    pub id: KeyframeId,
    pub animation: AnimationId,
    /// Seconds, >= 0. Not unique within an animation.
    pub time: f32,
    pub property: Property,
    pub value: Value,
    /// Ease name for the outgoing segment to the next keyframe of the same property.
    pub ease: String,
    /// Advisory: resists drag and batch retime, not enforced by the store.
    #[serde(default)]
    pub locked: bool,
    /// Extra structured fields that travel with the keyframe unchanged.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl Keyframe {
    /// Timing curve for the segment leaving this keyframe.
    #[inline]
    pub fn ease(&self) -> Ease {
        Ease::from_name(&self.ease)
    }
}

/// Partial keyframe update; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyframePatch {
    #[serde(default)]
    pub time: Option<f32>,
    #[serde(default)]
    pub property: Option<Property>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub ease: Option<String>,
    #[serde(default)]
    pub locked: Option<bool>,
}

impl KeyframePatch {
    pub fn time(time: f32) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.property.is_none()
            && self.value.is_none()
            && self.ease.is_none()
            && self.locked.is_none()
    }
}

/// Partial animation update; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimationPatch {
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub r#loop: Option<bool>,
    #[serde(default)]
    pub autoplay: Option<bool>,
    #[serde(default)]
    pub playback_rate: Option<f32>,
    #[serde(default)]
    pub order: Option<u32>,
}
