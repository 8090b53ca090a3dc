//! Keyframe sampling.
//!
//! Model:
//! - Keyframes of one property are ordered by (time, insertion).
//! - At time t the bracketing pair is `k0.time <= t < k1.time`.
//! - Before the first key the first value holds; after the last key the last value holds.
//! - Segment timing uses `k0`'s ease; `none` holds `k0` until `k1.time`.
//! - Bool values always step, whatever the declared ease.
//! - A property with no keyframes falls back to the object's live value.

use crate::binding::LiveProperties;
use crate::data::Keyframe;
use crate::ids::AnimationId;
use crate::interp::functions::{eased_value, step_value};
use crate::store::Store;
use crate::value::{Property, Value, ValueKind};

/// Sample time-ordered keyframes of a single property. `None` when `keys` is empty.
pub fn sample_keyframes(keys: &[&Keyframe], time: f32) -> Option<Value> {
    if keys.is_empty() {
        return None;
    }
    // Index of the first key strictly after `time`.
    let split = keys.partition_point(|k| k.time <= time);
    let k0 = split.checked_sub(1).map(|i| keys[i]);
    let k1 = keys.get(split).copied();
    match (k0, k1) {
        (None, Some(next)) => Some(next.value),
        (Some(prev), None) => Some(prev.value),
        (Some(prev), Some(next)) => {
            if prev.value.kind() == ValueKind::Bool {
                return Some(step_value(&prev.value));
            }
            let span = next.time - prev.time;
            let u = if span > 0.0 {
                (time - prev.time) / span
            } else {
                0.0
            };
            Some(eased_value(&prev.value, &next.value, u, prev.ease()))
        }
        (None, None) => None,
    }
}

/// Sample one property of an animation, falling back to the live value when unkeyed.
pub fn sample(
    store: &Store,
    animation: AnimationId,
    property: Property,
    time: f32,
    live: &dyn LiveProperties,
) -> Option<Value> {
    let keys = store.keyframes_of_property(animation, property);
    if keys.is_empty() {
        let object = &store.animation(animation)?.object;
        return live.live_value(object, property);
    }
    sample_keyframes(&keys, time)
}

/// Sample every keyed property of an animation at `time`, in `Property::ALL` order.
pub fn sample_animation(store: &Store, animation: AnimationId, time: f32) -> Vec<(Property, Value)> {
    let keys = store.keyframes_of(animation);
    let mut out = Vec::new();
    for property in Property::ALL {
        let lane: Vec<&Keyframe> = keys
            .iter()
            .copied()
            .filter(|k| k.property == property)
            .collect();
        if let Some(value) = sample_keyframes(&lane, time) {
            out.push((property, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::KeyframeId;

    fn key(id: u32, time: f32, value: Value, ease: &str) -> Keyframe {
        Keyframe {
            id: KeyframeId(id),
            animation: AnimationId(0),
            time,
            property: if value.kind() == ValueKind::Bool {
                Property::Visibility
            } else {
                Property::PositionX
            },
            value,
            ease: ease.to_string(),
            locked: false,
            extras: serde_json::Map::new(),
        }
    }

    #[test]
    fn empty_lane_samples_to_none() {
        assert_eq!(sample_keyframes(&[], 1.0), None);
    }

    #[test]
    fn exact_key_times_return_key_values() {
        let a = key(0, 0.0, Value::Number(0.0), "power2.out");
        let b = key(1, 10.0, Value::Number(100.0), "power2.out");
        assert_eq!(sample_keyframes(&[&a, &b], 0.0), Some(Value::Number(0.0)));
        assert_eq!(sample_keyframes(&[&a, &b], 10.0), Some(Value::Number(100.0)));
    }

    #[test]
    fn later_inserted_duplicate_wins_at_shared_time() {
        let a = key(0, 2.0, Value::Number(1.0), "linear");
        let b = key(1, 2.0, Value::Number(7.0), "linear");
        assert_eq!(sample_keyframes(&[&a, &b], 2.0), Some(Value::Number(7.0)));
        assert_eq!(sample_keyframes(&[&a, &b], 1.0), Some(Value::Number(1.0)));
    }

    #[test]
    fn bools_step_at_the_next_key() {
        let a = key(0, 0.0, Value::Bool(true), "linear");
        let b = key(1, 4.0, Value::Bool(false), "linear");
        assert_eq!(sample_keyframes(&[&a, &b], 3.99), Some(Value::Bool(true)));
        assert_eq!(sample_keyframes(&[&a, &b], 4.0), Some(Value::Bool(false)));
    }
}
