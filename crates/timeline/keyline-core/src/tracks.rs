//! Track projection: a read-only, per-property grouping of an animation's
//! keyframes for the editing surface and snapping.

use serde::{Deserialize, Serialize};

use crate::ids::{AnimationId, KeyframeId, ObjectId};
use crate::store::Store;
use crate::value::Property;

/// Summary of one keyframe glyph on a lane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeGlyph {
    pub id: KeyframeId,
    pub time: f32,
    pub locked: bool,
    pub ease: String,
}

/// Keyframes of one property, ordered by time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub property: Property,
    pub keyframes: Vec<KeyframeGlyph>,
}

/// One animated object's track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub animation: AnimationId,
    pub object: ObjectId,
    pub duration: f32,
    /// Only properties that have keyframes, in `Property::ALL` order.
    pub lanes: Vec<Lane>,
}

impl Track {
    pub fn lane(&self, property: Property) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.property == property)
    }

    /// Every keyframe glyph of the track, ordered by time.
    pub fn glyphs(&self) -> Vec<&KeyframeGlyph> {
        let mut all: Vec<&KeyframeGlyph> = self.lanes.iter().flat_map(|l| &l.keyframes).collect();
        all.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.id.cmp(&b.id)));
        all
    }

    /// Ids whose time falls inside `[start, end]` (inclusive, any property).
    pub fn ids_in_span(&self, start: f32, end: f32) -> Vec<KeyframeId> {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.glyphs()
            .into_iter()
            .filter(|g| g.time >= lo && g.time <= hi)
            .map(|g| g.id)
            .collect()
    }

    pub fn keyframe_count(&self) -> usize {
        self.lanes.iter().map(|l| l.keyframes.len()).sum()
    }
}

/// Project an animation into its track. `None` when the animation does not exist.
pub fn project_track(store: &Store, animation: AnimationId) -> Option<Track> {
    let anim = store.animation(animation)?;
    let keys = store.keyframes_of(animation);
    let lanes = Property::ALL
        .iter()
        .filter_map(|property| {
            let keyframes: Vec<KeyframeGlyph> = keys
                .iter()
                .filter(|k| k.property == *property)
                .map(|k| KeyframeGlyph {
                    id: k.id,
                    time: k.time,
                    locked: k.locked,
                    ease: k.ease.clone(),
                })
                .collect();
            if keyframes.is_empty() {
                None
            } else {
                Some(Lane {
                    property: *property,
                    keyframes,
                })
            }
        })
        .collect();
    Some(Track {
        animation,
        object: anim.object.clone(),
        duration: anim.duration,
        lanes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::value::Value;

    #[test]
    fn lanes_follow_property_order_and_time_order() {
        let mut store = Store::in_memory(&EditorConfig::default());
        let anim = store.ensure_animation(&ObjectId::new("a"), None).id;
        store
            .create_keyframe(anim, 3.0, Property::Opacity, Value::Number(1.0), None)
            .unwrap();
        store
            .create_keyframe(anim, 1.0, Property::PositionX, Value::Number(1.0), None)
            .unwrap();
        store
            .create_keyframe(anim, 0.5, Property::Opacity, Value::Number(0.0), None)
            .unwrap();

        let track = project_track(&store, anim).unwrap();
        let props: Vec<_> = track.lanes.iter().map(|l| l.property).collect();
        assert_eq!(props, vec![Property::PositionX, Property::Opacity]);
        let opacity = track.lane(Property::Opacity).unwrap();
        assert_eq!(opacity.keyframes[0].time, 0.5);
        assert_eq!(track.keyframe_count(), 3);
        assert_eq!(track.ids_in_span(2.0, 0.0).len(), 2);
    }

    #[test]
    fn missing_animation_projects_to_none() {
        let store = Store::in_memory(&EditorConfig::default());
        assert!(project_track(&store, AnimationId(9)).is_none());
    }
}
