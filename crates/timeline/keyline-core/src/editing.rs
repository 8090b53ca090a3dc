//! Editing operations over the store: batch retime, paste and duplicate.
//!
//! Ids that no longer resolve are dropped with a debug log; they are never
//! surfaced as errors.

use log::debug;

use crate::clipboard::Clipboard;
use crate::data::{Keyframe, KeyframePatch};
use crate::error::TimelineError;
use crate::ids::{AnimationId, KeyframeId};
use crate::store::{keyframe_order, Store};
use crate::Result;

fn duration_of(store: &Store, animation: AnimationId) -> Option<f32> {
    store.animation(animation).map(|a| a.duration)
}

/// Shift every unlocked member by `delta`, each clamped to `[0, duration]` on
/// its own. Returns the ids whose time actually changed.
pub fn batch_retime(store: &mut Store, ids: &[KeyframeId], delta: f32) -> Vec<KeyframeId> {
    if !delta.is_finite() || delta == 0.0 {
        return Vec::new();
    }
    let mut moves = Vec::new();
    for id in ids {
        let k = match store.resolve_keyframe(*id) {
            Ok(k) => k,
            Err(err) => {
                debug!("retime dropped: {}", err);
                continue;
            }
        };
        if k.locked {
            continue;
        }
        let Some(duration) = duration_of(store, k.animation) else {
            continue;
        };
        let time = (k.time + delta).clamp(0.0, duration);
        if time != k.time {
            moves.push((*id, time));
        }
    }
    commit_times(store, moves)
}

/// Write new times through the store, skipping ids that vanished meanwhile.
pub(crate) fn commit_times(store: &mut Store, moves: Vec<(KeyframeId, f32)>) -> Vec<KeyframeId> {
    let mut moved = Vec::with_capacity(moves.len());
    for (id, time) in moves {
        match store.update_keyframe(id, KeyframePatch::time(time)) {
            Ok(_) => moved.push(id),
            Err(TimelineError::KeyframeNotFound { id }) => {
                debug!("commit dropped: {}", TimelineError::StaleReference { id })
            }
            Err(err) => debug!("commit of {} skipped: {}", id, err),
        }
    }
    moved
}

/// Create one keyframe per clipboard entry at `base + offset`, clamped into
/// the animation's duration. Returns the new ids in clipboard order.
pub fn paste(
    store: &mut Store,
    animation: AnimationId,
    clipboard: &Clipboard,
    base: f32,
) -> Result<Vec<KeyframeId>> {
    let duration =
        duration_of(store, animation).ok_or(TimelineError::AnimationNotFound { id: animation })?;
    let base = if base.is_finite() { base } else { 0.0 };
    let mut created = Vec::with_capacity(clipboard.len());
    for entry in clipboard.entries() {
        let time = (base + entry.time_offset).clamp(0.0, duration);
        let k = store.create_keyframe(
            animation,
            time,
            entry.property,
            entry.value,
            Some(entry.ease.as_str()),
        )?;
        created.push(k.id);
    }
    Ok(created)
}

/// Copy each keyframe to `time + offset` in its own animation. Returns the
/// new ids ordered like their sources.
pub fn duplicate(store: &mut Store, ids: &[KeyframeId], offset: f32) -> Result<Vec<KeyframeId>> {
    let mut sources: Vec<Keyframe> = Vec::with_capacity(ids.len());
    for id in ids {
        match store.resolve_keyframe(*id) {
            Ok(k) => sources.push(k.clone()),
            Err(err) => debug!("duplicate dropped: {}", err),
        }
    }
    sources.sort_by(keyframe_order);
    let mut created = Vec::with_capacity(sources.len());
    for src in sources {
        let Some(duration) = duration_of(store, src.animation) else {
            continue;
        };
        let time = (src.time + offset).clamp(0.0, duration);
        let k = store.insert_keyframe(
            src.animation,
            time,
            src.property,
            src.value,
            Some(src.ease.as_str()),
            false,
            src.extras,
        )?;
        created.push(k.id);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::ids::ObjectId;
    use crate::value::{Property, Value};

    fn setup() -> (Store, AnimationId) {
        let mut store = Store::in_memory(&EditorConfig::default());
        let anim = store.ensure_animation(&ObjectId::new("box"), None).id;
        (store, anim)
    }

    #[test]
    fn retime_clamps_members_independently() {
        let (mut store, anim) = setup();
        let a = store
            .create_keyframe(anim, 0.0, Property::PositionX, Value::Number(0.0), None)
            .unwrap();
        let b = store
            .create_keyframe(anim, 1.0, Property::PositionX, Value::Number(1.0), None)
            .unwrap();
        let moved = batch_retime(&mut store, &[a.id, b.id], -5.0);
        assert_eq!(moved, vec![b.id]);
        assert_eq!(store.keyframe(a.id).unwrap().time, 0.0);
        assert_eq!(store.keyframe(b.id).unwrap().time, 0.0);
    }

    #[test]
    fn retime_leaves_locked_and_stale_alone() {
        let (mut store, anim) = setup();
        let a = store
            .create_keyframe(anim, 2.0, Property::Opacity, Value::Number(0.0), None)
            .unwrap();
        let b = store
            .create_keyframe(anim, 3.0, Property::Opacity, Value::Number(1.0), None)
            .unwrap();
        store
            .update_keyframe(a.id, KeyframePatch {
                locked: Some(true),
                ..KeyframePatch::default()
            })
            .unwrap();
        let moved = batch_retime(&mut store, &[a.id, b.id, KeyframeId(77)], 1.0);
        assert_eq!(moved, vec![b.id]);
        assert_eq!(store.keyframe(a.id).unwrap().time, 2.0);
        assert_eq!(store.keyframe(b.id).unwrap().time, 4.0);
    }

    #[test]
    fn duplicate_offsets_and_clamps() {
        let (mut store, anim) = setup();
        let a = store
            .create_keyframe(anim, 9.8, Property::Width, Value::Number(5.0), Some("none"))
            .unwrap();
        let created = duplicate(&mut store, &[a.id], 0.5).unwrap();
        let copy = store.keyframe(created[0]).unwrap();
        assert_eq!(copy.time, 10.0);
        assert_eq!(copy.ease, "none");
        assert_eq!(store.keyframe_count(), 2);
    }
}
