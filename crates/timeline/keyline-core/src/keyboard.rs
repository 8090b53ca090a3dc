//! Keyboard shortcuts for the editing engine, edge-triggered on key-down.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::inputs::{Key, KeyEvent};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortcut {
    Copy,
    Paste,
    Duplicate,
    SelectAll,
    Delete,
}

impl Shortcut {
    /// Binding for a key press, ignoring repeat and focus.
    pub fn for_key(key: &Key, command: bool) -> Option<Shortcut> {
        match (key.normalized(), command) {
            (Key::Char('c'), true) => Some(Shortcut::Copy),
            (Key::Char('v'), true) => Some(Shortcut::Paste),
            (Key::Char('d'), true) => Some(Shortcut::Duplicate),
            (Key::Char('a'), true) => Some(Shortcut::SelectAll),
            (Key::Delete, _) | (Key::Backspace, _) => Some(Shortcut::Delete),
            _ => None,
        }
    }
}

/// Tracks held keys so a shortcut fires once per physical press.
#[derive(Clone, Debug, Default)]
pub struct KeyboardShortcuts {
    held: HashSet<Key>,
}

impl KeyboardShortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> Option<Shortcut> {
        if event.in_text_input {
            return None;
        }
        let key = event.key.normalized();
        if event.repeat || !self.held.insert(key.clone()) {
            return None;
        }
        Shortcut::for_key(&key, event.command)
    }

    pub fn key_up(&mut self, key: &Key) {
        self.held.remove(&key.normalized());
    }

    /// Forget held keys (window lost focus).
    pub fn reset(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_until_released() {
        let mut kb = KeyboardShortcuts::new();
        let copy = KeyEvent::with_command(Key::Char('C'));
        assert_eq!(kb.key_down(&copy), Some(Shortcut::Copy));
        assert_eq!(kb.key_down(&copy), None);
        kb.key_up(&Key::Char('c'));
        assert_eq!(kb.key_down(&copy), Some(Shortcut::Copy));
    }

    #[test]
    fn ignores_repeat_text_input_and_plain_letters() {
        let mut kb = KeyboardShortcuts::new();
        let mut ev = KeyEvent::new(Key::Delete);
        ev.repeat = true;
        assert_eq!(kb.key_down(&ev), None);
        let mut typing = KeyEvent::with_command(Key::Char('a'));
        typing.in_text_input = true;
        assert_eq!(kb.key_down(&typing), None);
        assert_eq!(kb.key_down(&KeyEvent::new(Key::Char('d'))), None);
        assert_eq!(kb.key_down(&KeyEvent::new(Key::Backspace)), Some(Shortcut::Delete));
    }
}
