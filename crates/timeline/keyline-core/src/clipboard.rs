//! Keyframe clipboard: a value snapshot that survives deletion of its sources.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ids::KeyframeId;
use crate::store::{keyframe_order, Store};
use crate::value::{Property, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEntry {
    pub property: Property,
    pub value: Value,
    pub ease: String,
    /// Seconds after the earliest copied keyframe.
    pub time_offset: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the given keyframes, ordered by time. Ids the store no longer
    /// has are skipped.
    pub fn copy_from(ids: impl IntoIterator<Item = KeyframeId>, store: &Store) -> Self {
        let mut keys = Vec::new();
        for id in ids {
            match store.resolve_keyframe(id) {
                Ok(k) => keys.push(k),
                Err(err) => debug!("copy skipped: {}", err),
            }
        }
        keys.sort_by(|a, b| keyframe_order(a, b));
        let base = keys.first().map(|k| k.time).unwrap_or(0.0);
        let entries = keys
            .into_iter()
            .map(|k| ClipboardEntry {
                property: k.property,
                value: k.value,
                ease: k.ease.clone(),
                time_offset: k.time - base,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
