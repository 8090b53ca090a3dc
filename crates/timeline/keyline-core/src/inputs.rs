//! Input contracts for the editing engine.
//!
//! Hosts translate their native pointer and keyboard events into these and
//! feed them to `Timeline` one at a time; each event runs to completion.

use serde::{Deserialize, Serialize};

use crate::ids::KeyframeId;
use crate::selection::Modifiers;

/// Maps pointer x (pixels) to timeline seconds for one track.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    pub pixels_per_second: f32,
    /// Pointer x of time zero after scrolling.
    #[serde(default)]
    pub origin_x: f32,
}

impl TimeScale {
    pub fn new(pixels_per_second: f32, origin_x: f32) -> Self {
        Self {
            pixels_per_second,
            origin_x,
        }
    }

    #[inline]
    pub fn time_at(&self, x: f32) -> f32 {
        self.seconds(x - self.origin_x)
    }

    #[inline]
    pub fn x_at(&self, time: f32) -> f32 {
        self.origin_x + time * self.pixels_per_second
    }

    /// Pixel distance to seconds; zero when the scale is degenerate.
    #[inline]
    pub fn seconds(&self, dx: f32) -> f32 {
        if self.pixels_per_second > 0.0 && self.pixels_per_second.is_finite() {
            dx / self.pixels_per_second
        } else {
            0.0
        }
    }
}

/// What a pointer-down landed on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum HitTarget {
    Keyframe(KeyframeId),
    EmptyTrack,
    /// Buttons, handles and other chrome; never starts a gesture.
    Control,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    Down {
        x: f32,
        y: f32,
        target: HitTarget,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        x: f32,
        y: f32,
    },
    Up {
        x: f32,
        y: f32,
    },
    /// Pointer left the window mid-gesture.
    Leave,
    Cancel,
}

/// Keys the shortcut layer understands; everything else is `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Char(char),
    Delete,
    Backspace,
    Other(String),
}

impl Key {
    /// Case-folded for matching shortcuts.
    pub fn normalized(&self) -> Key {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: Key,
    /// Ctrl or Cmd held.
    #[serde(default)]
    pub command: bool,
    /// Host auto-repeat.
    #[serde(default)]
    pub repeat: bool,
    /// Focus is inside a text input.
    #[serde(default)]
    pub in_text_input: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            command: false,
            repeat: false,
            in_text_input: false,
        }
    }

    pub fn with_command(key: Key) -> Self {
        Self {
            command: true,
            ..Self::new(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_scale_maps_both_ways() {
        let scale = TimeScale::new(100.0, 20.0);
        assert_eq!(scale.time_at(270.0), 2.5);
        assert_eq!(scale.x_at(2.5), 270.0);
        assert_eq!(TimeScale::new(0.0, 0.0).seconds(50.0), 0.0);
    }

    #[test]
    fn pointer_events_deserialize_from_host_json() {
        let ev: PointerEvent = serde_json::from_str(
            r#"{"type":"down","x":10,"y":4,"target":{"kind":"keyframe","id":7},"modifiers":{"shift":true,"toggle":false}}"#,
        )
        .unwrap();
        match ev {
            PointerEvent::Down {
                target, modifiers, ..
            } => {
                assert_eq!(target, HitTarget::Keyframe(KeyframeId(7)));
                assert!(modifiers.shift);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
