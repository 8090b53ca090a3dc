//! Keyline core: timeline/keyframe animation engine (host-agnostic).
//!
//! This crate defines the animation/keyframe store, sampling and the playback
//! clock, the pointer-gesture and keyboard editing engine, snapping, the work
//! area, and the read-only track projection. Hosts supply persistence and
//! live property values through traits and paint `Outputs`.

pub mod binding;
pub mod clipboard;
pub mod clock;
pub mod config;
pub mod data;
pub mod editing;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod ids;
pub mod inputs;
pub mod interp;
pub mod keyboard;
pub mod outputs;
pub mod persistence;
pub mod sampling;
pub mod selection;
pub mod snapping;
pub mod store;
pub mod stored_timeline;
pub mod tracks;
pub mod value;
pub mod work_area;

// Re-exports for consumers (adapters)
pub use binding::{LiveProperties, LiveValues, NoLiveValues};
pub use clipboard::{Clipboard, ClipboardEntry};
pub use clock::{PlaybackClock, PlaybackState};
pub use config::EditorConfig;
pub use data::{Animation, AnimationPatch, Keyframe, KeyframePatch};
pub use editing::{batch_retime, duplicate, paste};
pub use engine::Timeline;
pub use error::TimelineError;
pub use gesture::{GestureEffect, GestureMachine, GestureState};
pub use ids::{AnimationId, KeyframeId, ObjectId, SceneId};
pub use inputs::{HitTarget, Key, KeyEvent, PointerEvent, TimeScale};
pub use interp::{Ease, EaseDirection};
pub use keyboard::{KeyboardShortcuts, Shortcut};
pub use outputs::{Change, Outputs, PlaybackEvent};
pub use persistence::{
    NullPersistence, PersistOp, Persistence, PersistenceError, PersistenceFailure,
    RecordingPersistence,
};
pub use sampling::{sample, sample_animation, sample_keyframes};
pub use selection::{Modifiers, Selection};
pub use snapping::{snap_drag_time, snap_targets, snap_to_frame, Snapper};
pub use store::Store;
pub use stored_timeline::{export_stored_timeline, load_stored_timeline, parse_stored_timeline};
pub use tracks::{project_track, Lane, Track};
pub use value::{Property, Value, ValueKind};
pub use work_area::{WorkArea, WorkAreaHandle};

pub type Result<T> = core::result::Result<T, TimelineError>;
