//! Editor configuration for keyline-core.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// Tunables for playback defaults, snapping and gesture mapping.
/// Every field has a default so partial JSON documents load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Frame grid used by drag snapping (frames per second).
    pub fps: f32,
    /// Maximum distance (seconds) for snapping to an existing keyframe.
    pub snap_threshold: f32,
    pub snap_to_keyframes: bool,
    /// Duration given to lazily created animations.
    pub default_duration: f32,
    /// Ease assigned to keyframes created without one.
    pub default_ease: String,
    /// Offset applied to duplicated keyframes.
    pub duplicate_offset: f32,
    /// Minimum distance between the work area's in and out points.
    pub work_area_min_span: f32,
    /// Horizontal zoom used to map pointer x to seconds.
    pub pixels_per_second: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            snap_threshold: 0.1,
            snap_to_keyframes: true,
            default_duration: 10.0,
            default_ease: "power2.out".to_string(),
            duplicate_offset: 0.5,
            work_area_min_span: 0.1,
            pixels_per_second: 100.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(s: &str) -> Result<Self, TimelineError> {
        let cfg: EditorConfig = serde_json::from_str(s)?;
        if !(cfg.default_duration.is_finite() && cfg.default_duration > 0.0) {
            return Err(TimelineError::InvalidDuration {
                duration: cfg.default_duration,
            });
        }
        Ok(cfg)
    }

    /// Length of one frame in seconds (0 disables the frame grid).
    #[inline]
    pub fn frame_duration(&self) -> f32 {
        if self.fps > 0.0 {
            1.0 / self.fps
        } else {
            0.0
        }
    }
}
