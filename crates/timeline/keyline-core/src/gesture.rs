//! Pointer gesture state machine for one track.
//!
//! `Idle -> DraggingKeyframe | Marquee -> Idle`. Drag and marquee gestures
//! install global move/up listeners on entry and remove them on exit; the
//! machine tracks whether they are installed so a removal is only ever
//! emitted once, however the gesture ends.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::editing::commit_times;
use crate::ids::{AnimationId, KeyframeId};
use crate::inputs::{HitTarget, PointerEvent, TimeScale};
use crate::selection::{Modifiers, Selection};
use crate::snapping::{snap_drag_time, snap_targets, Snapper};
use crate::store::Store;
use crate::tracks::project_track;

/// Side effects the host must carry out after an event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ids", rename_all = "camelCase")]
pub enum GestureEffect {
    InstallListeners,
    RemoveListeners,
    SelectionChanged,
    /// Keyframe times written to the store on drag release.
    Committed(Vec<KeyframeId>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragMember {
    pub id: KeyframeId,
    pub origin: f32,
    pub preview: f32,
    pub duration: f32,
    pub locked: bool,
}

/// Captured at pointer-down on an unlocked keyframe.
#[derive(Clone, Debug, PartialEq)]
pub struct DragContext {
    pub grabbed: KeyframeId,
    pub pointer_origin_x: f32,
    pub origin_time: f32,
    /// Upper clamp for the grabbed keyframe.
    pub duration: f32,
    /// Snapped time of the previous move.
    pub last_snapped: f32,
    pub members: Vec<DragMember>,
    /// Plain press on a member of a larger selection: a release without
    /// movement narrows the selection to the grabbed keyframe.
    pub collapse_on_release: bool,
    snapper: Snapper,
    fps: f32,
}

impl DragContext {
    pub fn preview_time(&self, id: KeyframeId) -> Option<f32> {
        self.members.iter().find(|m| m.id == id).map(|m| m.preview)
    }

    fn moved(&self) -> Vec<(KeyframeId, f32)> {
        self.members
            .iter()
            .filter(|m| m.preview != m.origin)
            .map(|m| (m.id, m.preview))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarqueeContext {
    pub start_x: f32,
    pub start_y: f32,
    pub current_x: f32,
    pub current_y: f32,
}

impl MarqueeContext {
    /// Time span covered by the rectangle, low to high.
    pub fn span(&self, scale: &TimeScale) -> (f32, f32) {
        let a = scale.time_at(self.start_x);
        let b = scale.time_at(self.current_x);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    DraggingKeyframe(DragContext),
    Marquee(MarqueeContext),
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DraggingKeyframe(_) => "dragging-keyframe",
            Self::Marquee(_) => "marquee",
        }
    }
}

/// Collaborators a gesture reads and mutates while handling one event.
pub struct GestureEnv<'a> {
    pub store: &'a mut Store,
    pub selection: &'a mut Selection,
    pub config: &'a EditorConfig,
    pub scale: TimeScale,
}

#[derive(Clone, Debug)]
pub struct GestureMachine {
    animation: AnimationId,
    state: GestureState,
    listening: bool,
    installs: u32,
    removals: u32,
}

impl GestureMachine {
    pub fn new(animation: AnimationId) -> Self {
        Self {
            animation,
            state: GestureState::Idle,
            listening: false,
            installs: 0,
            removals: 0,
        }
    }

    #[inline]
    pub fn animation(&self) -> AnimationId {
        self.animation
    }

    #[inline]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    #[inline]
    pub fn listeners_installed(&self) -> bool {
        self.listening
    }

    /// Lifetime count of (installs, removals).
    pub fn listener_counts(&self) -> (u32, u32) {
        (self.installs, self.removals)
    }

    /// Preview time of a keyframe being dragged.
    pub fn preview_time(&self, id: KeyframeId) -> Option<f32> {
        match &self.state {
            GestureState::DraggingKeyframe(ctx) => ctx.preview_time(id),
            _ => None,
        }
    }

    fn install(&mut self, effects: &mut Vec<GestureEffect>) {
        if !self.listening {
            self.listening = true;
            self.installs += 1;
            effects.push(GestureEffect::InstallListeners);
        }
    }

    fn remove(&mut self, effects: &mut Vec<GestureEffect>) {
        if self.listening {
            self.listening = false;
            self.removals += 1;
            effects.push(GestureEffect::RemoveListeners);
        }
    }

    fn transition(&mut self, next: GestureState) {
        if self.state.name() != next.name() {
            debug!(
                "{} gesture {} -> {}",
                self.animation,
                self.state.name(),
                next.name()
            );
        }
        self.state = next;
    }

    pub fn handle(&mut self, event: PointerEvent, env: &mut GestureEnv<'_>) -> Vec<GestureEffect> {
        let mut effects = Vec::new();
        match event {
            PointerEvent::Down {
                x,
                y,
                target,
                modifiers,
            } => {
                if !self.is_idle() {
                    self.abandon(&mut effects);
                }
                match target {
                    HitTarget::Keyframe(id) => self.press_keyframe(id, x, modifiers, env, &mut effects),
                    HitTarget::EmptyTrack => {
                        self.transition(GestureState::Marquee(MarqueeContext {
                            start_x: x,
                            start_y: y,
                            current_x: x,
                            current_y: y,
                        }));
                        self.install(&mut effects);
                    }
                    HitTarget::Control => {}
                }
            }
            PointerEvent::Move { x, y } => match &mut self.state {
                GestureState::DraggingKeyframe(ctx) => drag_to(ctx, x, &env.scale),
                GestureState::Marquee(ctx) => {
                    ctx.current_x = x;
                    ctx.current_y = y;
                }
                GestureState::Idle => {}
            },
            PointerEvent::Up { x, y } => {
                let finished = std::mem::take(&mut self.state);
                if !matches!(finished, GestureState::Idle) {
                    debug!("{} gesture {} -> idle", self.animation, finished.name());
                }
                match finished {
                    GestureState::DraggingKeyframe(mut ctx) => {
                        drag_to(&mut ctx, x, &env.scale);
                        let moves = ctx.moved();
                        if !moves.is_empty() {
                            let committed = commit_times(env.store, moves);
                            effects.push(GestureEffect::Committed(committed));
                        } else if ctx.collapse_on_release
                            && env.store.contains_keyframe(ctx.grabbed)
                        {
                            env.selection.select_only(ctx.grabbed);
                            effects.push(GestureEffect::SelectionChanged);
                        }
                    }
                    GestureState::Marquee(mut ctx) => {
                        ctx.current_x = x;
                        ctx.current_y = y;
                        self.finish_marquee(&ctx, env);
                        effects.push(GestureEffect::SelectionChanged);
                    }
                    GestureState::Idle => {}
                }
                self.remove(&mut effects);
            }
            PointerEvent::Leave | PointerEvent::Cancel => self.abandon(&mut effects),
        }
        effects
    }

    /// Drop the gesture without committing anything.
    pub fn cancel(&mut self) -> Vec<GestureEffect> {
        let mut effects = Vec::new();
        self.abandon(&mut effects);
        effects
    }

    fn abandon(&mut self, effects: &mut Vec<GestureEffect>) {
        self.transition(GestureState::Idle);
        self.remove(effects);
    }

    fn press_keyframe(
        &mut self,
        id: KeyframeId,
        x: f32,
        modifiers: Modifiers,
        env: &mut GestureEnv<'_>,
        effects: &mut Vec<GestureEffect>,
    ) {
        let grabbed = match env.store.resolve_keyframe(id) {
            Ok(k) => k.clone(),
            Err(err) => {
                debug!("pointer-down ignored: {}", err);
                return;
            }
        };
        let collapse = !modifiers.any()
            && env.selection.contains(id)
            && (env.selection.len() > 1 || env.selection.anchor() != Some(id));
        if modifiers.any() {
            env.selection.click(id, modifiers, env.store);
            effects.push(GestureEffect::SelectionChanged);
        } else if !env.selection.contains(id) {
            env.selection.select_only(id);
            effects.push(GestureEffect::SelectionChanged);
        }
        if grabbed.locked {
            debug!("{} is locked; not dragging", id);
            if collapse {
                env.selection.select_only(id);
                effects.push(GestureEffect::SelectionChanged);
            }
            return;
        }
        if !env.selection.contains(id) {
            return;
        }
        let Some(duration) = env.store.animation(grabbed.animation).map(|a| a.duration) else {
            return;
        };

        env.selection.retain_existing(env.store);
        let members: Vec<DragMember> = env
            .selection
            .ids()
            .filter_map(|m| env.store.keyframe(m))
            .filter_map(|k| {
                let d = env.store.animation(k.animation)?.duration;
                Some(DragMember {
                    id: k.id,
                    origin: k.time,
                    preview: k.time,
                    duration: d,
                    locked: k.locked,
                })
            })
            .collect();
        let exclude: Vec<KeyframeId> = members.iter().map(|m| m.id).collect();
        let mut targets = snap_targets(env.store, grabbed.animation, &exclude);
        // The grabbed keyframe can always return home.
        let home = targets.partition_point(|t| *t < grabbed.time);
        if targets.get(home) != Some(&grabbed.time) {
            targets.insert(home, grabbed.time);
        }
        let snapper = Snapper::new(
            targets,
            env.config.snap_threshold,
            env.config.snap_to_keyframes,
        );

        self.transition(GestureState::DraggingKeyframe(DragContext {
            grabbed: id,
            pointer_origin_x: x,
            origin_time: grabbed.time,
            duration,
            last_snapped: grabbed.time,
            members,
            collapse_on_release: collapse,
            snapper,
            fps: env.config.fps,
        }));
        self.install(effects);
    }

    fn finish_marquee(&self, ctx: &MarqueeContext, env: &mut GestureEnv<'_>) {
        let (lo, hi) = ctx.span(&env.scale);
        if hi <= lo {
            env.selection.clear();
            return;
        }
        match project_track(env.store, self.animation) {
            Some(track) => env.selection.replace(track.ids_in_span(lo, hi)),
            None => env.selection.clear(),
        }
    }
}

/// Move the drag to pointer `x`: snap the grabbed keyframe's candidate time
/// and shift every unlocked member by the change since the last move.
fn drag_to(ctx: &mut DragContext, x: f32, scale: &TimeScale) {
    let candidate =
        (ctx.origin_time + scale.seconds(x - ctx.pointer_origin_x)).clamp(0.0, ctx.duration);
    let snapped = snap_drag_time(candidate, ctx.fps, &ctx.snapper).clamp(0.0, ctx.duration);
    if snapped == ctx.origin_time {
        for m in &mut ctx.members {
            m.preview = m.origin;
        }
        ctx.last_snapped = snapped;
        return;
    }
    let delta = snapped - ctx.last_snapped;
    if delta == 0.0 {
        return;
    }
    for m in ctx.members.iter_mut().filter(|m| !m.locked) {
        m.preview = (m.preview + delta).clamp(0.0, m.duration);
    }
    ctx.last_snapped = snapped;
}
