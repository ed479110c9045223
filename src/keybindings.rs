//! Keyboard shortcuts for the stage editor.
//!
//! Maps a key chord to the [`Message`] it triggers. The host translates its
//! own key events into [`KeyChord`]s; nothing here talks to a windowing
//! system.

use crate::editor::Tool;
use crate::message::Message;

/// A key, independent of any windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Escape,
    Enter,
    /// A printable key, compared case-insensitively
    Char(char),
}

impl Key {
    fn matches(self, other: Key) -> bool {
        match (self, other) {
            (Key::Char(a), Key::Char(b)) => a.eq_ignore_ascii_case(&b),
            _ => self == other,
        }
    }
}

/// A key together with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    /// Ctrl on Linux/Windows, Cmd on macOS
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyChord {
    /// A bare key with no modifiers.
    pub fn key(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    /// `key` with the command modifier held.
    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Pressed with Ctrl
    pub undo: Key,
    /// Pressed with Ctrl; the undo key with Ctrl+Shift also redoes
    pub redo: Key,
    pub toggle_playback: Key,
    pub cancel: Key,
    /// Start or finish drawing a movement path
    pub path_tool: Key,
    /// Start or finish drawing an area
    pub area_tool: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            undo: Key::Char('z'),
            redo: Key::Char('y'),
            toggle_playback: Key::Space,
            cancel: Key::Escape,
            path_tool: Key::Char('p'),
            area_tool: Key::Char('a'),
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message a chord triggers, if any.
    pub fn message_for(&self, chord: KeyChord) -> Option<Message> {
        if chord.ctrl {
            if chord.key.matches(self.undo) {
                return Some(if chord.shift {
                    Message::Redo
                } else {
                    Message::Undo
                });
            }
            if chord.key.matches(self.redo) && !chord.shift {
                return Some(Message::Redo);
            }
            return None;
        }

        if chord.shift {
            return None;
        }
        let key = chord.key;
        if key.matches(self.toggle_playback) {
            Some(Message::TogglePlayback)
        } else if key.matches(self.cancel) {
            Some(Message::Cancel)
        } else if key.matches(self.path_tool) {
            Some(Message::ToggleTool(Tool::Path))
        } else if key.matches(self.area_tool) {
            Some(Message::ToggleTool(Tool::Area))
        } else {
            None
        }
    }

    /// What a key is already bound to, for conflict warnings when rebinding.
    pub fn key_conflict(&self, key: Key) -> Option<&'static str> {
        [
            (self.toggle_playback, "Toggle playback"),
            (self.cancel, "Cancel"),
            (self.path_tool, "Path tool"),
            (self.area_tool, "Area tool"),
        ]
        .into_iter()
        .find(|(bound, _)| bound.matches(key))
        .map(|(_, name)| name)
    }
}
