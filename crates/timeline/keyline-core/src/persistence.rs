//! Persistence collaborator contract.
//!
//! The store updates its in-memory state first and then forwards each mutation
//! here. Implementations are expected to enqueue the work and return quickly;
//! an `Err` is recorded by the store as a `PersistenceFailure` and never rolls
//! the local state back.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::data::{Animation, Keyframe};
use crate::ids::{AnimationId, KeyframeId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistenceError {
    #[error("transport error: {reason}")]
    Transport { reason: String },
    #[error("rejected by backend: {reason}")]
    Rejected { reason: String },
}

/// Host-side persistence. Every call is fire-and-forget from the engine's view.
pub trait Persistence {
    fn create_animation(&mut self, animation: &Animation) -> Result<(), PersistenceError>;
    fn update_animation(&mut self, animation: &Animation) -> Result<(), PersistenceError>;
    fn delete_animation(&mut self, id: AnimationId) -> Result<(), PersistenceError>;
    fn create_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), PersistenceError>;
    fn update_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), PersistenceError>;
    fn delete_keyframe(&mut self, id: KeyframeId) -> Result<(), PersistenceError>;
}

/// Which mutation a persistence call carried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistOp {
    CreateAnimation(AnimationId),
    UpdateAnimation(AnimationId),
    DeleteAnimation(AnimationId),
    CreateKeyframe(KeyframeId),
    UpdateKeyframe(KeyframeId),
    DeleteKeyframe(KeyframeId),
}

/// A failed optimistic mutation, left for the host to report or compensate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistenceFailure {
    pub op: PersistOp,
    pub error: PersistenceError,
}

/// Persistence that accepts and drops everything (offline/preview sessions).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistence;

impl Persistence for NullPersistence {
    fn create_animation(&mut self, _animation: &Animation) -> Result<(), PersistenceError> {
        Ok(())
    }
    fn update_animation(&mut self, _animation: &Animation) -> Result<(), PersistenceError> {
        Ok(())
    }
    fn delete_animation(&mut self, _id: AnimationId) -> Result<(), PersistenceError> {
        Ok(())
    }
    fn create_keyframe(&mut self, _keyframe: &Keyframe) -> Result<(), PersistenceError> {
        Ok(())
    }
    fn update_keyframe(&mut self, _keyframe: &Keyframe) -> Result<(), PersistenceError> {
        Ok(())
    }
    fn delete_keyframe(&mut self, _id: KeyframeId) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<PersistOp>,
    fail_with: Option<PersistenceError>,
}

/// Records every call. Clones share the same log, so a handle kept outside
/// the store observes what the store dispatched.
#[derive(Debug, Default, Clone)]
pub struct RecordingPersistence {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls made so far, in dispatch order.
    pub fn calls(&self) -> Vec<PersistOp> {
        self.state.borrow().calls.clone()
    }

    pub fn clear(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Make every following call fail with `error` (`None` restores success).
    pub fn fail_with(&self, error: Option<PersistenceError>) {
        self.state.borrow_mut().fail_with = error;
    }

    /// Number of recorded `UpdateKeyframe` calls.
    pub fn keyframe_updates(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|op| matches!(op, PersistOp::UpdateKeyframe(_)))
            .count()
    }

    fn record(&self, op: PersistOp) -> Result<(), PersistenceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(op);
        match &state.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Persistence for RecordingPersistence {
    fn create_animation(&mut self, animation: &Animation) -> Result<(), PersistenceError> {
        self.record(PersistOp::CreateAnimation(animation.id))
    }
    fn update_animation(&mut self, animation: &Animation) -> Result<(), PersistenceError> {
        self.record(PersistOp::UpdateAnimation(animation.id))
    }
    fn delete_animation(&mut self, id: AnimationId) -> Result<(), PersistenceError> {
        self.record(PersistOp::DeleteAnimation(id))
    }
    fn create_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), PersistenceError> {
        self.record(PersistOp::CreateKeyframe(keyframe.id))
    }
    fn update_keyframe(&mut self, keyframe: &Keyframe) -> Result<(), PersistenceError> {
        self.record(PersistOp::UpdateKeyframe(keyframe.id))
    }
    fn delete_keyframe(&mut self, id: KeyframeId) -> Result<(), PersistenceError> {
        self.record(PersistOp::DeleteKeyframe(id))
    }
}
