//! Interpolation helpers and named easing curves.
//!
//! `functions` holds the value blends (lerp, step); `ease` maps ease names to
//! pure `[0,1] -> [0,1]` timing curves.

pub mod ease;
pub mod functions;

pub use ease::{Ease, EaseDirection};
