//! Snapping: frame-grid quantization and snapping to existing keyframe times.

use crate::ids::{AnimationId, KeyframeId};
use crate::store::Store;

/// Sorted, de-duplicated keyframe times of an animation, skipping `exclude`
/// (keyframes being dragged never snap to themselves).
pub fn snap_targets(store: &Store, animation: AnimationId, exclude: &[KeyframeId]) -> Vec<f32> {
    let mut times: Vec<f32> = store
        .keyframes_of(animation)
        .into_iter()
        .filter(|k| !exclude.contains(&k.id))
        .map(|k| k.time)
        .collect();
    times.sort_by(|a, b| a.total_cmp(b));
    times.dedup();
    times
}

/// Quantize to the nearest frame boundary; `fps <= 0` disables the grid.
#[inline]
pub fn snap_to_frame(time: f32, fps: f32) -> f32 {
    if fps > 0.0 && fps.is_finite() {
        (time * fps).round() / fps
    } else {
        time
    }
}

/// Snaps candidate times to a fixed set of keyframe times.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapper {
    pub enabled: bool,
    pub threshold: f32,
    targets: Vec<f32>,
}

impl Snapper {
    /// `targets` must be sorted (as returned by `snap_targets`).
    pub fn new(targets: Vec<f32>, threshold: f32, enabled: bool) -> Self {
        Self {
            enabled,
            threshold,
            targets,
        }
    }

    pub fn targets(&self) -> &[f32] {
        &self.targets
    }

    /// Nearest target and its distance, regardless of the threshold.
    pub fn nearest(&self, time: f32) -> Option<(f32, f32)> {
        let idx = self.targets.partition_point(|t| *t < time);
        let below = idx.checked_sub(1).and_then(|i| self.targets.get(i));
        let above = self.targets.get(idx);
        [below, above]
            .into_iter()
            .flatten()
            .map(|t| (*t, (t - time).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Identity when disabled; else the nearest target within the threshold, else `time`.
    pub fn snap(&self, time: f32) -> f32 {
        if !self.enabled {
            return time;
        }
        match self.nearest(time) {
            Some((target, dist)) if dist <= self.threshold => target,
            _ => time,
        }
    }
}

/// Drag snapping: the nearer of the frame-grid candidate and the keyframe
/// candidate (ties go to the keyframe).
pub fn snap_drag_time(candidate: f32, fps: f32, snapper: &Snapper) -> f32 {
    let frame = snap_to_frame(candidate, fps);
    let keyed = if snapper.enabled {
        snapper
            .nearest(candidate)
            .filter(|(_, dist)| *dist <= snapper.threshold)
    } else {
        None
    };
    match keyed {
        Some((target, dist)) if dist <= (frame - candidate).abs() => target,
        _ => frame,
    }
}
