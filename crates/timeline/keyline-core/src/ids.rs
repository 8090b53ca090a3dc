//! Identifiers and simple allocators for timeline entities.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AnimationId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct KeyframeId(pub u32);

/// Host-owned animated object (screen element). Opaque to the engine.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectId(pub String);

/// Host-owned scene. Opaque to the engine.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SceneId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

impl fmt::Display for KeyframeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key#{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic allocator for AnimationId and KeyframeId.
/// Keyframe ids double as the insertion sequence used to order equal-time keys.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_animation: u32,
    next_keyframe: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_animation(&mut self) -> AnimationId {
        let id = AnimationId(self.next_animation);
        self.next_animation = self.next_animation.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_keyframe(&mut self) -> KeyframeId {
        let id = KeyframeId(self.next_keyframe);
        self.next_keyframe = self.next_keyframe.wrapping_add(1);
        id
    }

    /// Make sure ids handed out later never collide with `id` (used when loading stored data).
    pub fn observe_animation(&mut self, id: AnimationId) {
        if id.0 >= self.next_animation {
            self.next_animation = id.0.wrapping_add(1);
        }
    }

    pub fn observe_keyframe(&mut self, id: KeyframeId) {
        if id.0 >= self.next_keyframe {
            self.next_keyframe = id.0.wrapping_add(1);
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_animation(), AnimationId(0));
        assert_eq!(alloc.alloc_animation(), AnimationId(1));
        assert_eq!(alloc.alloc_keyframe(), KeyframeId(0));
        assert_eq!(alloc.alloc_keyframe(), KeyframeId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_keyframe(), KeyframeId(0));
    }

    #[test]
    fn observe_skips_past_loaded_ids() {
        let mut alloc = IdAllocator::new();
        alloc.observe_keyframe(KeyframeId(41));
        alloc.observe_keyframe(KeyframeId(3));
        assert_eq!(alloc.alloc_keyframe(), KeyframeId(42));
        alloc.observe_animation(AnimationId(7));
        assert_eq!(alloc.alloc_animation(), AnimationId(8));
    }
}
