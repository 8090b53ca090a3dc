//! Error types for the timeline engine

use serde::{Deserialize, Serialize};

use crate::ids::{AnimationId, KeyframeId};
use crate::persistence::PersistenceError;
use crate::value::ValueKind;

/// Error type for store, playback and editing operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineError {
    /// Property name outside the animatable enumeration
    #[error("Invalid property: {name}")]
    InvalidProperty { name: String },

    /// Negative or non-finite time
    #[error("Invalid time value: {time}")]
    InvalidTimeRange { time: f32 },

    /// Value does not match the property's declared kind
    #[error("Value type mismatch for {property}: expected {expected:?}, got {actual:?}")]
    ValueTypeMismatch {
        property: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Numeric values must be finite
    #[error("Invalid value for {property}: {value}")]
    InvalidValue { property: String, value: f32 },

    /// A stored document animates the same object twice
    #[error("Duplicate object in document: {object}")]
    DuplicateObject { object: String },

    /// Animation duration must be finite and > 0
    #[error("Invalid duration: {duration}")]
    InvalidDuration { duration: f32 },

    /// Playback rate must be finite and > 0
    #[error("Invalid playback rate: {rate}")]
    InvalidPlaybackRate { rate: f32 },

    #[error("Animation not found: {id}")]
    AnimationNotFound { id: AnimationId },

    #[error("Keyframe not found: {id}")]
    KeyframeNotFound { id: KeyframeId },

    /// Selection or clipboard referenced a keyframe the store no longer has
    #[error("Stale keyframe reference: {id}")]
    StaleReference { id: KeyframeId },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl TimelineError {
    /// Check if this is a recoverable condition (dropped and logged rather than surfaced)
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StaleReference { .. } | Self::Persistence(_))
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidProperty { .. }
            | Self::InvalidTimeRange { .. }
            | Self::ValueTypeMismatch { .. }
            | Self::InvalidValue { .. }
            | Self::DuplicateObject { .. }
            | Self::InvalidDuration { .. }
            | Self::InvalidPlaybackRate { .. } => "validation",
            Self::AnimationNotFound { .. } | Self::KeyframeNotFound { .. } => "data",
            Self::StaleReference { .. } => "stale",
            Self::Serialization { .. } => "serialization",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Validate a time at the call boundary. Callers clamp before calling.
#[inline]
pub(crate) fn check_time(time: f32) -> Result<f32, TimelineError> {
    if !time.is_finite() || time < 0.0 {
        return Err(TimelineError::InvalidTimeRange { time });
    }
    Ok(time)
}
