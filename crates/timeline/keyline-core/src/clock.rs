//! Playback clock.
//!
//! `Stopped -> Playing -> Paused -> Stopped`, with scrubbing as an overlay
//! flag that never changes the play state. The clock advances once per
//! frame tick while playing; the playback range is the work area when it is
//! enabled, else `[0, duration]`.

use serde::{Deserialize, Serialize};

use crate::data::Animation;
use crate::error::TimelineError;
use crate::outputs::PlaybackEvent;
use crate::work_area::WorkArea;
use crate::Result;

/// Playback state of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackClock {
    state: PlaybackState,
    time: f32,
    duration: f32,
    rate: f32,
    looping: bool,
    scrubbing: bool,
    #[serde(skip)]
    events: Vec<PlaybackEvent>,
}

impl PlaybackClock {
    pub fn new(duration: f32) -> Self {
        Self {
            state: PlaybackState::Stopped,
            time: 0.0,
            duration: duration.max(f32::EPSILON),
            rate: 1.0,
            looping: false,
            scrubbing: false,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Take duration, rate and loop flag from the active animation.
    pub fn configure(&mut self, animation: &Animation) -> Result<()> {
        self.set_duration(animation.duration)?;
        self.set_rate(animation.playback_rate)?;
        self.looping = animation.r#loop;
        Ok(())
    }

    pub fn set_duration(&mut self, duration: f32) -> Result<()> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TimelineError::InvalidDuration { duration });
        }
        self.duration = duration;
        if self.time > duration {
            self.time = duration;
        }
        Ok(())
    }

    pub fn set_rate(&mut self, rate: f32) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(TimelineError::InvalidPlaybackRate { rate });
        }
        self.rate = rate;
        Ok(())
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Move the playhead. Clamps to `[0, duration]`, never to the work area.
    pub fn seek(&mut self, time: f32) -> Result<()> {
        if !time.is_finite() {
            return Err(TimelineError::InvalidTimeRange { time });
        }
        self.time = time.clamp(0.0, self.duration);
        self.events.push(PlaybackEvent::Seeked { time: self.time });
        Ok(())
    }

    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    /// Seek while the scrub overlay is active.
    pub fn scrub(&mut self, time: f32) -> Result<()> {
        self.scrubbing = true;
        self.seek(time)
    }

    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    pub fn play(&mut self, work_area: &WorkArea) {
        if self.state.is_playing() {
            return;
        }
        let (lo, hi) = work_area.range(self.duration);
        let outside = work_area.enabled && !work_area.contains(self.time);
        let at_end = !self.looping && self.time >= hi;
        if outside || at_end {
            self.time = lo;
            self.events.push(PlaybackEvent::Seeked { time: lo });
        }
        self.state = PlaybackState::Playing;
        self.events.push(PlaybackEvent::Playing);
    }

    pub fn pause(&mut self) {
        if self.state.can_pause() {
            self.state = PlaybackState::Paused;
            self.events.push(PlaybackEvent::Paused);
        }
    }

    /// Stop and rewind to the start of the playback range.
    pub fn stop(&mut self, work_area: &WorkArea) {
        let (lo, _) = work_area.range(self.duration);
        let moved = self.time != lo;
        self.time = lo;
        if self.state != PlaybackState::Stopped {
            self.state = PlaybackState::Stopped;
            self.events.push(PlaybackEvent::Stopped);
        } else if moved {
            self.events.push(PlaybackEvent::Seeked { time: lo });
        }
    }

    pub fn toggle(&mut self, work_area: &WorkArea) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play(work_area);
        }
    }

    /// Advance by `elapsed` wall seconds. Returns whether the playhead moved.
    pub fn tick(&mut self, elapsed: f32, work_area: &WorkArea) -> bool {
        if !self.state.is_playing() || self.scrubbing || elapsed.is_nan() || elapsed <= 0.0 {
            return false;
        }
        let (lo, hi) = work_area.range(self.duration);
        let before = self.time;
        self.time += elapsed * self.rate;
        if self.time >= hi {
            let span = hi - lo;
            if self.looping && span > 0.0 {
                self.time = lo + (self.time - hi).rem_euclid(span);
            } else {
                self.time = hi;
                self.state = PlaybackState::Stopped;
                self.events.push(PlaybackEvent::Stopped);
            }
        }
        self.time != before
    }

    /// Drain the playback events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "left={a} right={b}");
    }

    #[test]
    fn seek_clamps_to_duration_not_work_area() {
        let mut clock = PlaybackClock::new(10.0);
        let mut wa = WorkArea::new(10.0, 0.1);
        wa.set_in(2.0, 10.0);
        wa.set_out(4.0, 10.0);
        wa.enabled = true;
        clock.seek(8.0).unwrap();
        approx(clock.time(), 8.0);
        clock.seek(-3.0).unwrap();
        approx(clock.time(), 0.0);
        clock.seek(30.0).unwrap();
        approx(clock.time(), 10.0);
        assert!(clock.seek(f32::NAN).is_err());
        assert_eq!(clock.state(), PlaybackState::Stopped);
    }

    #[test]
    fn once_mode_stops_at_the_end() {
        let mut clock = PlaybackClock::new(2.0);
        let wa = WorkArea::new(2.0, 0.1);
        clock.play(&wa);
        clock.tick(1.5, &wa);
        approx(clock.time(), 1.5);
        clock.tick(1.0, &wa);
        approx(clock.time(), 2.0);
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(
            clock.drain_events(),
            vec![PlaybackEvent::Playing, PlaybackEvent::Stopped]
        );
    }

    #[test]
    fn loop_wraps_inside_the_work_area() {
        let mut clock = PlaybackClock::new(10.0);
        clock.set_looping(true);
        let mut wa = WorkArea::new(10.0, 0.1);
        wa.set_in(2.0, 10.0);
        wa.set_out(4.0, 10.0);
        wa.enabled = true;
        clock.play(&wa);
        approx(clock.time(), 2.0);
        clock.tick(2.5, &wa);
        approx(clock.time(), 2.5);
        assert!(clock.state().is_playing());
    }

    #[test]
    fn rate_scales_elapsed_time() {
        let mut clock = PlaybackClock::new(10.0);
        clock.set_rate(2.0).unwrap();
        let wa = WorkArea::new(10.0, 0.1);
        clock.play(&wa);
        clock.tick(1.0, &wa);
        approx(clock.time(), 2.0);
        assert!(clock.set_rate(0.0).is_err());
    }

    #[test]
    fn scrubbing_freezes_ticks_without_changing_state() {
        let mut clock = PlaybackClock::new(10.0);
        let wa = WorkArea::new(10.0, 0.1);
        clock.play(&wa);
        clock.scrub(5.0).unwrap();
        assert!(!clock.tick(1.0, &wa));
        assert!(clock.state().is_playing());
        clock.end_scrub();
        assert!(clock.tick(1.0, &wa));
        approx(clock.time(), 6.0);
    }

    #[test]
    fn play_at_end_rewinds_and_stop_resets() {
        let mut clock = PlaybackClock::new(3.0);
        let wa = WorkArea::new(3.0, 0.1);
        clock.seek(3.0).unwrap();
        clock.play(&wa);
        approx(clock.time(), 0.0);
        clock.tick(1.0, &wa);
        clock.pause();
        assert_eq!(clock.state(), PlaybackState::Paused);
        clock.stop(&wa);
        assert_eq!(clock.state(), PlaybackState::Stopped);
        approx(clock.time(), 0.0);
    }
}
