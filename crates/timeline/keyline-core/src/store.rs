//! Keyframe/Animation store.
//!
//! The store exclusively owns animation and keyframe lifetime. It validates
//! at the call boundary (times, property names, value kinds), keeps the
//! time-ordered query guarantees, and forwards every mutation to the
//! `Persistence` collaborator after applying it locally. Persistence failures
//! are queued for the host; local state is never rolled back.

use std::cmp::Ordering;
use std::fmt;

use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::EditorConfig;
use crate::data::{Animation, AnimationPatch, Keyframe, KeyframePatch};
use crate::error::{check_time, TimelineError};
use crate::ids::{AnimationId, IdAllocator, KeyframeId, ObjectId, SceneId};
use crate::interp::Ease;
use crate::persistence::{
    NullPersistence, PersistOp, Persistence, PersistenceError, PersistenceFailure,
};
use crate::value::{Property, Value};
use crate::Result;

/// Order keyframes by time, then by insertion (later-inserted sorts last).
#[inline]
pub fn keyframe_order(a: &Keyframe, b: &Keyframe) -> Ordering {
    a.time.total_cmp(&b.time).then(a.id.cmp(&b.id))
}

fn check_duration(duration: f32) -> Result<f32> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(TimelineError::InvalidDuration { duration });
    }
    Ok(duration)
}

fn check_rate(rate: f32) -> Result<f32> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(TimelineError::InvalidPlaybackRate { rate });
    }
    Ok(rate)
}

fn note_unknown_ease(name: &str) {
    if Ease::parse(name).is_none() {
        debug!("ease '{}' is not recognised; sampling falls back to linear", name);
    }
}

pub struct Store {
    ids: IdAllocator,
    default_duration: f32,
    default_ease: String,
    animations: HashMap<AnimationId, Animation>,
    by_object: HashMap<ObjectId, AnimationId>,
    keyframes: HashMap<KeyframeId, Keyframe>,
    members: HashMap<AnimationId, Vec<KeyframeId>>,
    persistence: Box<dyn Persistence>,
    failures: Vec<PersistenceFailure>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("animations", &self.animations.len())
            .field("keyframes", &self.keyframes.len())
            .field("default_duration", &self.default_duration)
            .field("pending_failures", &self.failures.len())
            .finish()
    }
}

impl Store {
    pub fn new(cfg: &EditorConfig, persistence: Box<dyn Persistence>) -> Self {
        Self {
            ids: IdAllocator::new(),
            default_duration: cfg.default_duration,
            default_ease: cfg.default_ease.clone(),
            animations: HashMap::new(),
            by_object: HashMap::new(),
            keyframes: HashMap::new(),
            members: HashMap::new(),
            persistence,
            failures: Vec::new(),
        }
    }

    /// Store without a backend (mutations are only kept in memory).
    pub fn in_memory(cfg: &EditorConfig) -> Self {
        Self::new(cfg, Box::new(NullPersistence))
    }

    /// Duration given to animations created by `ensure_animation`.
    pub fn default_duration(&self) -> f32 {
        self.default_duration
    }

    pub fn set_default_duration(&mut self, duration: f32) -> Result<()> {
        self.default_duration = check_duration(duration)?;
        Ok(())
    }

    pub fn default_ease(&self) -> &str {
        &self.default_ease
    }

    /// Drain the persistence failures recorded since the last call.
    pub fn take_persistence_failures(&mut self) -> Vec<PersistenceFailure> {
        std::mem::take(&mut self.failures)
    }

    fn note(&mut self, op: PersistOp, result: std::result::Result<(), PersistenceError>) {
        if let Err(error) = result {
            warn!("persistence call {:?} failed: {}", op, error);
            self.failures.push(PersistenceFailure { op, error });
        }
    }

    // ----- animations -----

    /// Return the object's animation, creating one on first use.
    pub fn ensure_animation(&mut self, object: &ObjectId, scene: Option<&SceneId>) -> Animation {
        if let Some(existing) = self
            .by_object
            .get(object)
            .and_then(|id| self.animations.get(id))
        {
            return existing.clone();
        }
        let order = self
            .animations
            .values()
            .filter(|a| a.scene.as_ref() == scene)
            .map(|a| a.order + 1)
            .max()
            .unwrap_or(0);
        let animation = Animation {
            id: self.ids.alloc_animation(),
            object: object.clone(),
            scene: scene.cloned(),
            duration: self.default_duration,
            r#loop: false,
            autoplay: false,
            playback_rate: 1.0,
            order,
        };
        debug!("creating {} for object '{}'", animation.id, object);
        self.by_object.insert(object.clone(), animation.id);
        self.members.insert(animation.id, Vec::new());
        self.animations.insert(animation.id, animation.clone());
        let result = self.persistence.create_animation(&animation);
        self.note(PersistOp::CreateAnimation(animation.id), result);
        animation
    }

    pub fn update_animation(&mut self, id: AnimationId, patch: AnimationPatch) -> Result<Animation> {
        if let Some(d) = patch.duration {
            check_duration(d)?;
        }
        if let Some(r) = patch.playback_rate {
            check_rate(r)?;
        }
        let animation = self
            .animations
            .get_mut(&id)
            .ok_or(TimelineError::AnimationNotFound { id })?;
        if let Some(d) = patch.duration {
            animation.duration = d;
        }
        if let Some(l) = patch.r#loop {
            animation.r#loop = l;
        }
        if let Some(a) = patch.autoplay {
            animation.autoplay = a;
        }
        if let Some(r) = patch.playback_rate {
            animation.playback_rate = r;
        }
        if let Some(o) = patch.order {
            animation.order = o;
        }
        let updated = animation.clone();
        let result = self.persistence.update_animation(&updated);
        self.note(PersistOp::UpdateAnimation(id), result);
        Ok(updated)
    }

    /// Remove an animation and every keyframe it owns.
    pub fn delete_animation(&mut self, id: AnimationId) -> Result<()> {
        let animation = self
            .animations
            .remove(&id)
            .ok_or(TimelineError::AnimationNotFound { id })?;
        self.by_object.remove(&animation.object);
        for key in self.members.remove(&id).unwrap_or_default() {
            self.keyframes.remove(&key);
        }
        debug!("deleted {} (object '{}')", id, animation.object);
        let result = self.persistence.delete_animation(id);
        self.note(PersistOp::DeleteAnimation(id), result);
        Ok(())
    }

    /// Object deleted by the host: drop its animation (if any) with all keyframes.
    pub fn delete_object(&mut self, object: &ObjectId) -> Option<AnimationId> {
        let id = *self.by_object.get(object)?;
        self.delete_animation(id).ok()?;
        Some(id)
    }

    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(&id)
    }

    pub fn animation_for_object(&self, object: &ObjectId) -> Option<&Animation> {
        self.by_object
            .get(object)
            .and_then(|id| self.animations.get(id))
    }

    /// Animations of one scene (or of no scene), ordered by their order index.
    pub fn animations_in_scene(&self, scene: Option<&SceneId>) -> Vec<&Animation> {
        let mut out: Vec<&Animation> = self
            .animations
            .values()
            .filter(|a| a.scene.as_ref() == scene)
            .collect();
        out.sort_by_key(|a| (a.order, a.id));
        out
    }

    /// All animations ordered by id.
    pub fn animations(&self) -> Vec<&Animation> {
        let mut out: Vec<&Animation> = self.animations.values().collect();
        out.sort_by_key(|a| a.id);
        out
    }

    // ----- keyframes -----

    /// Create a keyframe. The caller clamps `time` into the animation's duration.
    pub fn create_keyframe(
        &mut self,
        animation: AnimationId,
        time: f32,
        property: Property,
        value: Value,
        ease: Option<&str>,
    ) -> Result<Keyframe> {
        self.insert_keyframe(
            animation,
            time,
            property,
            value,
            ease,
            false,
            serde_json::Map::new(),
        )
    }

    /// String entry point used by hosts that carry property names.
    pub fn create_keyframe_named(
        &mut self,
        animation: AnimationId,
        time: f32,
        property: &str,
        value: Value,
        ease: Option<&str>,
    ) -> Result<Keyframe> {
        let property = Property::parse(property)?;
        self.create_keyframe(animation, time, property, value, ease)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn insert_keyframe(
        &mut self,
        animation: AnimationId,
        time: f32,
        property: Property,
        value: Value,
        ease: Option<&str>,
        locked: bool,
        extras: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Keyframe> {
        check_time(time)?;
        value.check_for(property)?;
        if !self.animations.contains_key(&animation) {
            return Err(TimelineError::AnimationNotFound { id: animation });
        }
        let ease = ease.unwrap_or(self.default_ease.as_str()).to_string();
        note_unknown_ease(&ease);
        let keyframe = Keyframe {
            id: self.ids.alloc_keyframe(),
            animation,
            time,
            property,
            value,
            ease,
            locked,
            extras,
        };
        self.members
            .entry(animation)
            .or_default()
            .push(keyframe.id);
        self.keyframes.insert(keyframe.id, keyframe.clone());
        let result = self.persistence.create_keyframe(&keyframe);
        self.note(PersistOp::CreateKeyframe(keyframe.id), result);
        Ok(keyframe)
    }

    /// Partial update. Changing `property` does not re-check uniqueness (last write wins).
    pub fn update_keyframe(&mut self, id: KeyframeId, patch: KeyframePatch) -> Result<Keyframe> {
        if let Some(t) = patch.time {
            check_time(t)?;
        }
        let current = self
            .keyframes
            .get(&id)
            .ok_or(TimelineError::KeyframeNotFound { id })?;
        if patch.is_empty() {
            return Ok(current.clone());
        }
        let property = patch.property.unwrap_or(current.property);
        let value = patch.value.unwrap_or(current.value);
        value.check_for(property)?;
        if let Some(e) = &patch.ease {
            note_unknown_ease(e);
        }

        let keyframe = self
            .keyframes
            .get_mut(&id)
            .ok_or(TimelineError::KeyframeNotFound { id })?;
        if let Some(t) = patch.time {
            keyframe.time = t;
        }
        keyframe.property = property;
        keyframe.value = value;
        if let Some(e) = patch.ease {
            keyframe.ease = e;
        }
        if let Some(l) = patch.locked {
            keyframe.locked = l;
        }
        let updated = keyframe.clone();
        let result = self.persistence.update_keyframe(&updated);
        self.note(PersistOp::UpdateKeyframe(id), result);
        Ok(updated)
    }

    /// Delete a keyframe; the owning animation goes with its last keyframe.
    pub fn delete_keyframe(&mut self, id: KeyframeId) -> Result<()> {
        let keyframe = self
            .keyframes
            .remove(&id)
            .ok_or(TimelineError::KeyframeNotFound { id })?;
        let now_empty = match self.members.get_mut(&keyframe.animation) {
            Some(list) => {
                list.retain(|k| *k != id);
                list.is_empty()
            }
            None => false,
        };
        let result = self.persistence.delete_keyframe(id);
        self.note(PersistOp::DeleteKeyframe(id), result);
        if now_empty {
            debug!("{} lost its last keyframe", keyframe.animation);
            self.delete_animation(keyframe.animation)?;
        }
        Ok(())
    }

    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.get(&id)
    }

    #[inline]
    /// Look up a keyframe held by a selection, clipboard or gesture.
    /// A missing id is a `StaleReference`.
    pub fn resolve_keyframe(&self, id: KeyframeId) -> Result<&Keyframe> {
        self.keyframes
            .get(&id)
            .ok_or(TimelineError::StaleReference { id })
    }

    pub fn contains_keyframe(&self, id: KeyframeId) -> bool {
        self.keyframes.contains_key(&id)
    }

    /// All keyframes of an animation, ordered by time (ties by insertion).
    pub fn keyframes_of(&self, animation: AnimationId) -> Vec<&Keyframe> {
        let mut out: Vec<&Keyframe> = self
            .members
            .get(&animation)
            .map(|ids| ids.iter().filter_map(|k| self.keyframes.get(k)).collect())
            .unwrap_or_default();
        out.sort_by(|a, b| keyframe_order(a, b));
        out
    }

    /// Keyframes of one property, ordered by time (ties by insertion).
    pub fn keyframes_of_property(&self, animation: AnimationId, property: Property) -> Vec<&Keyframe> {
        let mut out: Vec<&Keyframe> = self
            .members
            .get(&animation)
            .map(|ids| {
                ids.iter()
                    .filter_map(|k| self.keyframes.get(k))
                    .filter(|k| k.property == property)
                    .collect()
            })
            .unwrap_or_default();
        out.sort_by(|a, b| keyframe_order(a, b));
        out
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Insert already-persisted entities (loading). Nothing is forwarded to persistence.
    pub(crate) fn insert_loaded(&mut self, animation: Animation, keyframes: Vec<Keyframe>) -> Result<()> {
        check_duration(animation.duration)?;
        check_rate(animation.playback_rate)?;
        for k in &keyframes {
            check_time(k.time)?;
            k.value.check_for(k.property)?;
        }
        if let Some(previous) = self.by_object.get(&animation.object).copied() {
            self.animations.remove(&previous);
            for key in self.members.remove(&previous).unwrap_or_default() {
                self.keyframes.remove(&key);
            }
        }
        self.ids.observe_animation(animation.id);
        let id = animation.id;
        self.by_object.insert(animation.object.clone(), id);
        self.animations.insert(id, animation);
        let list = self.members.entry(id).or_default();
        for mut k in keyframes {
            self.ids.observe_keyframe(k.id);
            k.animation = id;
            list.push(k.id);
            self.keyframes.insert(k.id, k);
        }
        Ok(())
    }

    /// Allocate a fresh keyframe id (loader support for documents without ids).
    pub(crate) fn alloc_keyframe_id(&mut self) -> KeyframeId {
        self.ids.alloc_keyframe()
    }

    pub(crate) fn alloc_animation_id(&mut self) -> AnimationId {
        self.ids.alloc_animation()
    }

    /// Keep later allocations clear of an id a document is about to use.
    pub(crate) fn observe_animation_id(&mut self, id: AnimationId) {
        self.ids.observe_animation(id);
    }

    pub(crate) fn observe_keyframe_id(&mut self, id: KeyframeId) {
        self.ids.observe_keyframe(id);
    }
}
