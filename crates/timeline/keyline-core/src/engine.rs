//! Timeline editing session.
//!
//! `Timeline` owns the store, the playback clock, the work area, the
//! selection and clipboard, and one gesture machine per track. Hosts feed it
//! pointer/keyboard events and frame ticks, and read `frame()` outputs back.

use hashbrown::HashMap;
use log::debug;

use crate::binding::{LiveProperties, NoLiveValues};
use crate::clipboard::Clipboard;
use crate::clock::PlaybackClock;
use crate::config::EditorConfig;
use crate::data::{Animation, AnimationPatch, Keyframe, KeyframePatch};
use crate::editing;
use crate::gesture::{GestureEffect, GestureEnv, GestureMachine};
use crate::ids::{AnimationId, KeyframeId, ObjectId, SceneId};
use crate::inputs::{Key, KeyEvent, PointerEvent, TimeScale};
use crate::keyboard::{KeyboardShortcuts, Shortcut};
use crate::outputs::{Change, Outputs};
use crate::persistence::{NullPersistence, Persistence, PersistenceFailure};
use crate::sampling::{sample, sample_animation};
use crate::selection::{Modifiers, Selection};
use crate::store::Store;
use crate::stored_timeline;
use crate::value::{Property, Value};
use crate::work_area::{WorkArea, WorkAreaHandle};
use crate::Result;

#[derive(Clone, Debug, PartialEq)]
struct ActiveObject {
    object: ObjectId,
    scene: Option<SceneId>,
}

pub struct Timeline {
    config: EditorConfig,
    store: Store,
    clock: PlaybackClock,
    work_area: WorkArea,
    selection: Selection,
    clipboard: Clipboard,
    keyboard: KeyboardShortcuts,
    gestures: HashMap<AnimationId, GestureMachine>,
    live: Box<dyn LiveProperties>,
    active: Option<ActiveObject>,
    outputs: Outputs,
}

impl Timeline {
    pub fn new(config: EditorConfig, persistence: Box<dyn Persistence>) -> Self {
        let store = Store::new(&config, persistence);
        let clock = PlaybackClock::new(config.default_duration);
        let work_area = WorkArea::new(config.default_duration, config.work_area_min_span);
        Self {
            config,
            store,
            clock,
            work_area,
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            keyboard: KeyboardShortcuts::new(),
            gestures: HashMap::new(),
            live: Box::new(NoLiveValues),
            active: None,
            outputs: Outputs::default(),
        }
    }

    /// Session without a persistence backend.
    pub fn in_memory(config: EditorConfig) -> Self {
        Self::new(config, Box::new(NullPersistence))
    }

    pub fn set_live_properties(&mut self, live: Box<dyn LiveProperties>) {
        self.live = live;
    }

    // ----- accessors -----

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn work_area(&self) -> &WorkArea {
        &self.work_area
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn gesture(&self, animation: AnimationId) -> Option<&GestureMachine> {
        self.gestures.get(&animation)
    }

    /// Pointer mapping for a track scrolled to `origin_x`.
    pub fn time_scale(&self, origin_x: f32) -> TimeScale {
        TimeScale::new(self.config.pixels_per_second, origin_x)
    }

    pub fn take_persistence_failures(&mut self) -> Vec<PersistenceFailure> {
        self.store.take_persistence_failures()
    }

    // ----- active object -----

    /// Focus an object. Its animation (if any) drives the clock.
    pub fn set_active_object(&mut self, object: ObjectId, scene: Option<SceneId>) {
        self.active = Some(ActiveObject { object, scene });
        self.sync_clock();
    }

    pub fn clear_active_object(&mut self) {
        self.active = None;
    }

    pub fn active_animation(&self) -> Option<AnimationId> {
        let active = self.active.as_ref()?;
        self.store.animation_for_object(&active.object).map(|a| a.id)
    }

    fn sync_clock(&mut self) {
        let configured = match self.active_animation().and_then(|id| self.store.animation(id)) {
            Some(anim) => self.clock.configure(anim),
            None => self.clock.set_duration(self.store.default_duration()),
        };
        if let Err(err) = configured {
            debug!("clock kept its settings: {}", err);
        }
        self.work_area.fit_duration(self.clock.duration());
    }

    fn ensure_active_animation(&mut self) -> Option<Animation> {
        let active = self.active.clone()?;
        let existed = self.store.animation_for_object(&active.object).is_some();
        let anim = self
            .store
            .ensure_animation(&active.object, active.scene.as_ref());
        if !existed {
            self.sync_clock();
        }
        Some(anim)
    }

    // ----- playback -----

    /// Set the clock duration. Also becomes the duration of new animations.
    pub fn set_duration(&mut self, duration: f32) -> Result<()> {
        self.clock.set_duration(duration)?;
        self.store.set_default_duration(duration)?;
        if let Some(id) = self.active_animation() {
            self.store.update_animation(
                id,
                AnimationPatch {
                    duration: Some(duration),
                    ..AnimationPatch::default()
                },
            )?;
        }
        self.work_area.fit_duration(duration);
        Ok(())
    }

    pub fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.clock.set_looping(looping);
        if let Some(id) = self.active_animation() {
            self.store.update_animation(
                id,
                AnimationPatch {
                    r#loop: Some(looping),
                    ..AnimationPatch::default()
                },
            )?;
        }
        Ok(())
    }

    pub fn set_playback_rate(&mut self, rate: f32) -> Result<()> {
        self.clock.set_rate(rate)?;
        if let Some(id) = self.active_animation() {
            self.store.update_animation(
                id,
                AnimationPatch {
                    playback_rate: Some(rate),
                    ..AnimationPatch::default()
                },
            )?;
        }
        Ok(())
    }

    pub fn play(&mut self) {
        self.clock.play(&self.work_area);
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn stop(&mut self) {
        self.clock.stop(&self.work_area);
    }

    pub fn toggle(&mut self) {
        self.clock.toggle(&self.work_area);
    }

    pub fn seek(&mut self, time: f32) -> Result<()> {
        self.clock.seek(time)
    }

    pub fn begin_scrub(&mut self) {
        self.clock.begin_scrub();
    }

    pub fn scrub(&mut self, time: f32) -> Result<()> {
        self.clock.scrub(time)
    }

    pub fn end_scrub(&mut self) {
        self.clock.end_scrub();
    }

    /// Per-frame callback. Returns whether the playhead moved.
    pub fn tick(&mut self, elapsed: f32) -> bool {
        self.clock.tick(elapsed, &self.work_area)
    }

    /// Sample every keyed property at the clock time and drain playback
    /// events. With an active object only its scene is sampled.
    pub fn frame(&mut self) -> &Outputs {
        self.outputs.clear();
        let time = self.clock.time();
        self.outputs.time = time;
        let animations: Vec<(AnimationId, ObjectId)> = match &self.active {
            Some(active) => self.store.animations_in_scene(active.scene.as_ref()),
            None => self.store.animations(),
        }
        .into_iter()
        .map(|a| (a.id, a.object.clone()))
        .collect();
        for (id, object) in animations {
            for (property, value) in sample_animation(&self.store, id, time) {
                self.outputs.push_change(Change {
                    object: object.clone(),
                    animation: id,
                    property,
                    value,
                });
            }
        }
        for event in self.clock.drain_events() {
            self.outputs.push_event(event);
        }
        &self.outputs
    }

    /// Current value of one property: sampled when keyed, else the live value.
    pub fn value_at(&self, object: &ObjectId, property: Property) -> Option<Value> {
        match self.store.animation_for_object(object) {
            Some(anim) => sample(
                &self.store,
                anim.id,
                property,
                self.clock.time(),
                self.live.as_ref(),
            ),
            None => self.live.live_value(object, property),
        }
    }

    // ----- work area -----

    pub fn set_work_area_enabled(&mut self, enabled: bool) {
        self.work_area.enabled = enabled;
    }

    pub fn drag_work_area(&mut self, handle: WorkAreaHandle, time_or_delta: f32) {
        self.work_area
            .drag(handle, time_or_delta, self.clock.duration());
    }

    // ----- gestures -----

    /// Route a pointer event to the track of `animation`.
    pub fn pointer(
        &mut self,
        animation: AnimationId,
        event: PointerEvent,
        scale: TimeScale,
    ) -> Vec<GestureEffect> {
        self.selection.retain_existing(&self.store);
        let machine = self
            .gestures
            .entry(animation)
            .or_insert_with(|| GestureMachine::new(animation));
        let mut env = GestureEnv {
            store: &mut self.store,
            selection: &mut self.selection,
            config: &self.config,
            scale,
        };
        let effects = machine.handle(event, &mut env);
        self.prune_gestures();
        effects
    }

    /// Abandon every in-flight gesture (window blur).
    pub fn cancel_gestures(&mut self) -> Vec<GestureEffect> {
        let mut effects = Vec::new();
        for machine in self.gestures.values_mut() {
            effects.extend(machine.cancel());
        }
        self.prune_gestures();
        effects
    }

    /// Drop idle machines whose animation is gone.
    fn prune_gestures(&mut self) {
        let store = &self.store;
        self.gestures
            .retain(|id, m| !m.is_idle() || store.animation(*id).is_some());
    }

    /// Click semantics outside a gesture (e.g. a lane list).
    pub fn click(&mut self, id: KeyframeId, modifiers: Modifiers) {
        match self.store.resolve_keyframe(id) {
            Ok(_) => self.selection.click(id, modifiers, &self.store),
            Err(err) => debug!("click ignored: {}", err),
        }
    }

    // ----- editing -----

    pub fn batch_retime(&mut self, delta: f32) -> Vec<KeyframeId> {
        self.selection.retain_existing(&self.store);
        let ids = self.selection.to_vec();
        editing::batch_retime(&mut self.store, &ids, delta)
    }

    /// Snapshot the selection. An empty selection leaves the clipboard alone.
    pub fn copy(&mut self) -> usize {
        self.selection.retain_existing(&self.store);
        if self.selection.is_empty() {
            return 0;
        }
        self.clipboard = Clipboard::copy_from(self.selection.ids(), &self.store);
        self.clipboard.len()
    }

    /// Paste at the clock time into the active object's animation.
    pub fn paste(&mut self) -> Result<Vec<KeyframeId>> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        let Some(anim) = self.ensure_active_animation() else {
            debug!("paste ignored: no active object");
            return Ok(Vec::new());
        };
        let created = editing::paste(&mut self.store, anim.id, &self.clipboard, self.clock.time())?;
        self.selection.replace(created.iter().copied());
        Ok(created)
    }

    /// Copy the selection and paste each keyframe `duplicate_offset` later in
    /// its own animation.
    pub fn duplicate(&mut self) -> Result<Vec<KeyframeId>> {
        self.selection.retain_existing(&self.store);
        if self.selection.is_empty() {
            return Ok(Vec::new());
        }
        let ids = self.selection.to_vec();
        self.clipboard = Clipboard::copy_from(ids.iter().copied(), &self.store);
        let created = editing::duplicate(&mut self.store, &ids, self.config.duplicate_offset)?;
        self.selection.replace(created.iter().copied());
        Ok(created)
    }

    /// Select every keyframe of the active animation, or of all animations
    /// when no object is active.
    pub fn select_all(&mut self) {
        let animations: Vec<AnimationId> = match self.active_animation() {
            Some(id) => vec![id],
            None if self.active.is_some() => Vec::new(),
            None => self.store.animations().into_iter().map(|a| a.id).collect(),
        };
        let store = &self.store;
        let ids: Vec<KeyframeId> = animations
            .into_iter()
            .flat_map(|a| store.keyframes_of(a).into_iter().map(|k| k.id))
            .collect();
        self.selection.replace(ids);
    }

    pub fn delete_selected(&mut self) -> Vec<KeyframeId> {
        let ids = self.selection.to_vec();
        self.selection.clear();
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.delete_keyframe(id) {
                Ok(()) => deleted.push(id),
                Err(err) => debug!("delete dropped {}: {}", id, err),
            }
        }
        self.prune_gestures();
        deleted
    }

    /// Key the property at the clock time, creating the animation on first
    /// use. An existing keyframe of the property at exactly that time is
    /// overwritten instead.
    pub fn record_keyframe(
        &mut self,
        object: &ObjectId,
        scene: Option<&SceneId>,
        property: Property,
        value: Value,
    ) -> Result<Keyframe> {
        value.check_for(property)?;
        let existed = self.store.animation_for_object(object).is_some();
        let anim = self.store.ensure_animation(object, scene);
        if !existed && self.active.as_ref().map(|a| &a.object) == Some(object) {
            self.sync_clock();
        }
        let time = self.clock.time().clamp(0.0, anim.duration);
        let same_time = self
            .store
            .keyframes_of_property(anim.id, property)
            .into_iter()
            .rev()
            .find(|k| k.time == time)
            .map(|k| k.id);
        match same_time {
            Some(id) => self.store.update_keyframe(
                id,
                KeyframePatch {
                    value: Some(value),
                    ..KeyframePatch::default()
                },
            ),
            None => self.store.create_keyframe(anim.id, time, property, value, None),
        }
    }

    /// Object removed by the host.
    pub fn delete_object(&mut self, object: &ObjectId) -> Option<AnimationId> {
        let id = self.store.delete_object(object)?;
        self.selection.retain_existing(&self.store);
        self.prune_gestures();
        Some(id)
    }

    /// Load a stored timeline document and refresh the clock for the active object.
    pub fn load_stored_timeline(&mut self, json: &str) -> Result<Vec<AnimationId>> {
        let loaded = stored_timeline::load_stored_timeline(&mut self.store, json)?;
        self.selection.retain_existing(&self.store);
        self.sync_clock();
        Ok(loaded)
    }

    // ----- keyboard -----

    /// Run the shortcut bound to a key press, if any.
    pub fn key_down(&mut self, event: &KeyEvent) -> Result<Option<Shortcut>> {
        let Some(shortcut) = self.keyboard.key_down(event) else {
            return Ok(None);
        };
        debug!("shortcut {:?}", shortcut);
        match shortcut {
            Shortcut::Copy => {
                self.copy();
            }
            Shortcut::Paste => {
                self.paste()?;
            }
            Shortcut::Duplicate => {
                self.duplicate()?;
            }
            Shortcut::SelectAll => self.select_all(),
            Shortcut::Delete => {
                self.delete_selected();
            }
        }
        Ok(Some(shortcut))
    }

    pub fn key_up(&mut self, key: &Key) {
        self.keyboard.key_up(key);
    }

    /// Window lost focus: forget held keys and abandon gestures.
    pub fn blur(&mut self) -> Vec<GestureEffect> {
        self.keyboard.reset();
        self.cancel_gestures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_creates_animation_and_keys_at_clock_time() {
        let mut tl = Timeline::in_memory(EditorConfig::default());
        let obj = ObjectId::new("logo");
        tl.set_active_object(obj.clone(), None);
        tl.seek(2.0).unwrap();
        let k = tl
            .record_keyframe(&obj, None, Property::Opacity, Value::Number(0.5))
            .unwrap();
        assert_eq!(k.time, 2.0);
        let again = tl
            .record_keyframe(&obj, None, Property::Opacity, Value::Number(0.8))
            .unwrap();
        assert_eq!(again.id, k.id);
        assert_eq!(tl.store().keyframe_count(), 1);
        assert!(tl
            .record_keyframe(&obj, None, Property::Visibility, Value::Number(1.0))
            .is_err());
    }

    #[test]
    fn frame_reports_samples_and_events() {
        let mut tl = Timeline::in_memory(EditorConfig::default());
        let obj = ObjectId::new("logo");
        tl.record_keyframe(&obj, None, Property::PositionX, Value::Number(0.0))
            .unwrap();
        tl.play();
        let out = tl.frame();
        assert_eq!(out.value_of(&obj, Property::PositionX), Some(Value::Number(0.0)));
        assert_eq!(out.events, vec![crate::outputs::PlaybackEvent::Playing]);
        assert!(tl.frame().events.is_empty());
    }
}
