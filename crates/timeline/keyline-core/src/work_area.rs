//! Work area: a bounded sub-range of the timeline used for preview looping.
//!
//! Invariant after every operation: `0 <= in_point < out_point <= duration`,
//! with the two points at least `min_span` apart (or the whole duration when
//! the animation is shorter than that).

use serde::{Deserialize, Serialize};

/// Which part of the work area a drag grabbed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkAreaHandle {
    In,
    Out,
    Region,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkArea {
    pub enabled: bool,
    in_point: f32,
    out_point: f32,
    min_span: f32,
}

impl WorkArea {
    /// Disabled work area covering the whole duration.
    pub fn new(duration: f32, min_span: f32) -> Self {
        Self {
            enabled: false,
            in_point: 0.0,
            out_point: duration.max(0.0),
            min_span: min_span.max(0.0),
        }
    }

    #[inline]
    pub fn in_point(&self) -> f32 {
        self.in_point
    }

    #[inline]
    pub fn out_point(&self) -> f32 {
        self.out_point
    }

    #[inline]
    fn gap(&self, duration: f32) -> f32 {
        self.min_span.min(duration)
    }

    /// Move the in handle; it stops `min_span` before the out point.
    pub fn set_in(&mut self, time: f32, duration: f32) {
        if !time.is_finite() {
            return;
        }
        self.fit_duration(duration);
        let max_in = (self.out_point - self.gap(duration)).max(0.0);
        self.in_point = time.clamp(0.0, max_in);
    }

    /// Move the out handle; it stops `min_span` after the in point.
    pub fn set_out(&mut self, time: f32, duration: f32) {
        if !time.is_finite() {
            return;
        }
        self.fit_duration(duration);
        let min_out = (self.in_point + self.gap(duration)).min(duration);
        self.out_point = time.clamp(min_out, duration);
    }

    /// Drag the whole region by `delta`, preserving its width inside `[0, duration]`.
    pub fn translate(&mut self, delta: f32, duration: f32) {
        if !delta.is_finite() {
            return;
        }
        self.fit_duration(duration);
        let width = self.out_point - self.in_point;
        let start = (self.in_point + delta).clamp(0.0, (duration - width).max(0.0));
        if start + width >= duration {
            self.out_point = duration;
            self.in_point = (duration - width).max(0.0);
        } else {
            self.in_point = start;
            self.out_point = start + width;
        }
    }

    /// Apply a handle drag.
    pub fn drag(&mut self, handle: WorkAreaHandle, time_or_delta: f32, duration: f32) {
        match handle {
            WorkAreaHandle::In => self.set_in(time_or_delta, duration),
            WorkAreaHandle::Out => self.set_out(time_or_delta, duration),
            WorkAreaHandle::Region => self.translate(time_or_delta, duration),
        }
    }

    /// Re-establish the invariant after the animation duration changed.
    pub fn fit_duration(&mut self, duration: f32) {
        let gap = self.gap(duration);
        if self.out_point > duration {
            self.out_point = duration;
        }
        if self.in_point > self.out_point - gap {
            self.in_point = (self.out_point - gap).max(0.0);
        }
        if self.out_point < self.in_point + gap {
            self.out_point = (self.in_point + gap).min(duration);
        }
    }

    /// Playback range: the work area when enabled, else the whole duration.
    pub fn range(&self, duration: f32) -> (f32, f32) {
        if self.enabled {
            let out = self.out_point.min(duration);
            let start = self.in_point.min(out);
            (start, out)
        } else {
            (0.0, duration)
        }
    }

    #[inline]
    pub fn contains(&self, time: f32) -> bool {
        time >= self.in_point && time <= self.out_point
    }
}
