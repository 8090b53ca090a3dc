//! Keyframe selection: a set of ids plus the anchor used for range selection.

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::ids::KeyframeId;
use crate::store::Store;

/// Modifier keys held during a click or pointer-down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub toggle: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        toggle: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        toggle: false,
    };
    pub const TOGGLE: Modifiers = Modifiers {
        shift: false,
        toggle: true,
    };

    #[inline]
    pub fn any(&self) -> bool {
        self.shift || self.toggle
    }
}

/// Insertion-ordered set of selected keyframes with an optional anchor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    ids: IndexSet<KeyframeId>,
    anchor: Option<KeyframeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> impl Iterator<Item = KeyframeId> + '_ {
        self.ids.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<KeyframeId> {
        self.ids.iter().copied().collect()
    }

    #[inline]
    pub fn contains(&self, id: KeyframeId) -> bool {
        self.ids.contains(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Range pivot and inspector subject.
    #[inline]
    pub fn anchor(&self) -> Option<KeyframeId> {
        self.anchor
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.anchor = None;
    }

    /// Replace the selection with one keyframe and make it the anchor.
    pub fn select_only(&mut self, id: KeyframeId) {
        self.ids.clear();
        self.ids.insert(id);
        self.anchor = Some(id);
    }

    /// Replace the selection wholesale; the first id becomes the anchor.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = KeyframeId>) {
        self.ids = ids.into_iter().collect();
        self.anchor = self.ids.first().copied();
    }

    /// Add or remove one keyframe. Removing the anchor re-anchors on the
    /// most recently added remaining member.
    pub fn toggle(&mut self, id: KeyframeId) {
        if self.ids.shift_remove(&id) {
            if self.anchor == Some(id) {
                self.anchor = self.ids.last().copied();
            }
        } else {
            self.ids.insert(id);
            self.anchor = Some(id);
        }
    }

    pub fn remove(&mut self, id: KeyframeId) {
        if self.ids.shift_remove(&id) && self.anchor == Some(id) {
            self.anchor = self.ids.last().copied();
        }
    }

    /// Click semantics: plain replaces, toggle flips membership, shift selects
    /// the inclusive same-property time range from the anchor. Shift across
    /// properties (or without an anchor) falls back to a single selection.
    pub fn click(&mut self, id: KeyframeId, modifiers: Modifiers, store: &Store) {
        if modifiers.toggle {
            self.toggle(id);
            return;
        }
        if modifiers.shift {
            if let Some(range) = self.range_from_anchor(id, store) {
                let anchor = self.anchor;
                self.ids = range.into_iter().collect();
                self.anchor = anchor;
                return;
            }
        }
        self.select_only(id);
    }

    fn range_from_anchor(&self, clicked: KeyframeId, store: &Store) -> Option<Vec<KeyframeId>> {
        let anchor = store.keyframe(self.anchor?)?;
        let target = store.keyframe(clicked)?;
        if anchor.animation != target.animation || anchor.property != target.property {
            return None;
        }
        let (lo, hi) = if anchor.time <= target.time {
            (anchor.time, target.time)
        } else {
            (target.time, anchor.time)
        };
        Some(
            store
                .keyframes_of_property(anchor.animation, anchor.property)
                .into_iter()
                .filter(|k| k.time >= lo && k.time <= hi)
                .map(|k| k.id)
                .collect(),
        )
    }

    /// Drop ids the store no longer has. Returns the dropped ids.
    pub fn retain_existing(&mut self, store: &Store) -> Vec<KeyframeId> {
        let stale: Vec<KeyframeId> = self
            .ids
            .iter()
            .copied()
            .filter(|id| !store.contains_keyframe(*id))
            .collect();
        for id in &stale {
            debug!("selection dropped: {}", TimelineError::StaleReference { id: *id });
            self.remove(*id);
        }
        if let Some(anchor) = self.anchor {
            if !store.contains_keyframe(anchor) {
                self.anchor = self.ids.last().copied();
            }
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_reanchors_when_the_anchor_leaves() {
        let mut sel = Selection::new();
        sel.select_only(KeyframeId(1));
        sel.toggle(KeyframeId(2));
        sel.toggle(KeyframeId(3));
        assert_eq!(sel.anchor(), Some(KeyframeId(3)));
        sel.toggle(KeyframeId(3));
        assert_eq!(sel.anchor(), Some(KeyframeId(2)));
        sel.toggle(KeyframeId(2));
        sel.toggle(KeyframeId(1));
        assert!(sel.is_empty());
        assert_eq!(sel.anchor(), None);
    }

    #[test]
    fn removing_a_non_anchor_keeps_the_anchor() {
        let mut sel = Selection::new();
        sel.replace([KeyframeId(4), KeyframeId(5)]);
        assert_eq!(sel.anchor(), Some(KeyframeId(4)));
        sel.toggle(KeyframeId(5));
        assert_eq!(sel.anchor(), Some(KeyframeId(4)));
    }

    #[test]
    fn serializes_for_undo_snapshots() {
        let mut sel = Selection::new();
        sel.replace([KeyframeId(1), KeyframeId(2)]);
        let json = serde_json::to_string(&sel).unwrap();
        let back: Selection = serde_json::from_str(&json).unwrap();
        assert_eq!(sel, back);
    }
}
