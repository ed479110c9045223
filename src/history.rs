//! Undo/redo history over whole-document snapshots.
//!
//! Every mutating editor action records the resulting document as a
//! [`HistoryEntry`]. The entries form a linear list with a cursor pointing at
//! the entry that matches the live document:
//!
//! - `None`: nothing recorded yet, or everything undone (the baseline).
//! - `Some(i)`: the live document equals `entries[i].state`.
//!
//! Snapshots are cheap because [`StageDocument`](crate::model::StageDocument)
//! shares its collections copy-on-write. The list is capped; when it grows
//! past the cap the oldest entry is dropped. The baseline never changes, so
//! undoing past the oldest retained entry always lands on the initial state.

use std::collections::VecDeque;
use std::fmt;

use crate::constants::MAX_HISTORY_DEPTH;

// ============================================================================
// Entries
// ============================================================================

/// What kind of edit produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    AddActor,
    UpdateActor,
    MoveActor,
    DeleteActor,
    AddElement,
    MoveElement,
    DeleteElement,
    AddLight,
    MoveLight,
    DeleteLight,
    AddMusic,
    DeleteMusic,
    AddDialogue,
    UpdateDialogue,
    DeleteDialogue,
    AddMovement,
    DeleteMovement,
    AddArea,
    DeleteArea,
    /// A whole document was loaded or replaced
    Load,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::AddActor => "add_actor",
            ActionKind::UpdateActor => "update_actor",
            ActionKind::MoveActor => "move_actor",
            ActionKind::DeleteActor => "delete_actor",
            ActionKind::AddElement => "add_element",
            ActionKind::MoveElement => "move_element",
            ActionKind::DeleteElement => "delete_element",
            ActionKind::AddLight => "add_light",
            ActionKind::MoveLight => "move_light",
            ActionKind::DeleteLight => "delete_light",
            ActionKind::AddMusic => "add_music",
            ActionKind::DeleteMusic => "delete_music",
            ActionKind::AddDialogue => "add_dialogue",
            ActionKind::UpdateDialogue => "update_dialogue",
            ActionKind::DeleteDialogue => "delete_dialogue",
            ActionKind::AddMovement => "add_movement",
            ActionKind::DeleteMovement => "delete_movement",
            ActionKind::AddArea => "add_area",
            ActionKind::DeleteArea => "delete_area",
            ActionKind::Load => "load",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable snapshot tagged with the action that produced it.
#[derive(Debug, Clone)]
pub struct HistoryEntry<S> {
    /// Monotonic sequence number, never reused
    pub id: u64,
    pub kind: ActionKind,
    pub description: String,
    /// Wall-clock time of the action, ms since the Unix epoch
    pub timestamp_ms: u64,
    pub state: S,
}

// ============================================================================
// History
// ============================================================================

/// Linear, capped snapshot history.
#[derive(Debug, Clone)]
pub struct History<S> {
    entries: VecDeque<HistoryEntry<S>>,
    cursor: Option<usize>,
    baseline: S,
    max_depth: usize,
    next_id: u64,
    /// Nesting depth of restores in progress; `save` is ignored while > 0
    suspended: u32,
}

impl<S: Clone + Default> Default for History<S> {
    fn default() -> Self {
        Self::new(MAX_HISTORY_DEPTH)
    }
}

impl<S: Clone + Default> History<S> {
    /// Empty history whose baseline is `S::default()`.
    pub fn new(max_depth: usize) -> Self {
        Self::with_baseline(S::default(), max_depth)
    }
}

impl<S: Clone> History<S> {
    /// Empty history that undoes back to `baseline`.
    pub fn with_baseline(baseline: S, max_depth: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            baseline,
            max_depth: max_depth.max(1),
            next_id: 0,
            suspended: 0,
        }
    }

    /// Record `state` as the result of an action.
    ///
    /// Discards the redo branch. Returns false when recording is suspended.
    pub fn save(&mut self, kind: ActionKind, description: impl Into<String>, state: S) -> bool {
        let description = description.into();
        if self.suspended > 0 {
            log::trace!("History: save of '{}' suppressed during restore", description);
            return false;
        }

        let keep = self.cursor.map_or(0, |c| c + 1);
        let dropped = self.entries.len() - keep;
        self.entries.truncate(keep);
        if dropped > 0 {
            log::debug!("History: discarded {} redo entries", dropped);
        }

        let id = self.next_id;
        self.next_id += 1;
        log::debug!("📝 History: #{} {} '{}'", id, kind, description);
        self.entries.push_back(HistoryEntry {
            id,
            kind,
            description,
            timestamp_ms: stagehand_time::unix_millis(),
            state,
        });

        while self.entries.len() > self.max_depth {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("History: evicted #{} '{}'", evicted.id, evicted.description);
            }
        }
        self.cursor = Some(self.entries.len() - 1);
        true
    }

    /// Step back one entry and return the state to restore.
    ///
    /// Leaving the oldest entry yields the baseline. Returns `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<&S> {
        let cursor = self.cursor?;
        if cursor == 0 {
            self.cursor = None;
            log::debug!("⏪ History: undo to baseline");
            return Some(&self.baseline);
        }
        self.cursor = Some(cursor - 1);
        let entry = &self.entries[cursor - 1];
        log::debug!("⏪ History: undo to #{} '{}'", entry.id, entry.description);
        Some(&entry.state)
    }

    /// Step forward one entry and return the state to restore.
    pub fn redo(&mut self) -> Option<&S> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        let entry = &self.entries[next];
        log::debug!("⏩ History: redo to #{} '{}'", entry.id, entry.description);
        Some(&entry.state)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.entries.len()
    }

    /// Description of the action an undo would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.cursor.map(|c| self.entries[c].description.as_str())
    }

    /// Description of the action a redo would re-apply.
    pub fn redo_description(&self) -> Option<&str> {
        let next = self.cursor.map_or(0, |c| c + 1);
        self.entries.get(next).map(|e| e.description.as_str())
    }

    /// Mark the start of a restore. Calls nest.
    pub fn suspend(&mut self) {
        self.suspended += 1;
    }

    /// Mark the end of a restore started with [`suspend`](Self::suspend).
    pub fn resume(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<S>> + '_ {
        self.entries.iter()
    }

    /// Drop every entry and start over from `baseline`.
    pub fn reset(&mut self, baseline: S) {
        self.entries.clear();
        self.cursor = None;
        self.baseline = baseline;
        log::debug!("🗑️ History cleared");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_history() {
        let mut history: History<Vec<u32>> = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.max_depth(), MAX_HISTORY_DEPTH);
    }

    #[test]
    fn test_add_then_move_example() {
        let mut history: History<Vec<&str>> = History::default();
        let after_a = vec!["actor@(400,250)"];
        let after_b = vec!["actor@(500,300)"];
        history.save(ActionKind::AddActor, "add actor", after_a.clone());
        history.save(ActionKind::MoveActor, "move actor", after_b.clone());

        assert_eq!(history.undo(), Some(&after_a));
        assert_eq!(history.undo(), Some(&Vec::new()));
        assert!(history.undo().is_none());

        assert_eq!(history.redo(), Some(&after_a));
        assert_eq!(history.redo(), Some(&after_b));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_save_discards_redo_branch() {
        let mut history: History<u32> = History::default();
        history.save(ActionKind::AddActor, "1", 1);
        history.save(ActionKind::AddActor, "2", 2);
        history.undo();
        assert!(history.can_redo());
        assert_eq!(history.redo_description(), Some("2"));

        history.save(ActionKind::AddActor, "3", 3);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_cap_evicts_oldest_and_keeps_baseline() {
        let mut history: History<u32> = History::new(3);
        for i in 1..=5 {
            history.save(ActionKind::MoveActor, format!("move {i}"), i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));

        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        // Entries 1 and 2 are gone; the baseline is still the initial state
        assert_eq!(history.undo(), Some(&0));
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_suspend_suppresses_save() {
        let mut history: History<u32> = History::default();
        history.suspend();
        history.suspend();
        assert!(!history.save(ActionKind::Load, "restore", 1));
        history.resume();
        assert!(history.is_suspended());
        assert!(!history.save(ActionKind::Load, "restore", 1));
        history.resume();
        assert!(history.save(ActionKind::AddActor, "real", 2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_entries_have_increasing_ids() {
        let mut history: History<u32> = History::default();
        history.save(ActionKind::AddLight, "a", 1);
        history.undo();
        history.save(ActionKind::AddLight, "b", 2);
        let ids: Vec<u64> = history.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(history.undo_description(), Some("b"));
    }

    #[test]
    fn test_custom_baseline() {
        let mut history = History::with_baseline(10u32, 5);
        history.save(ActionKind::AddActor, "add", 11);
        assert_eq!(history.undo(), Some(&10));
        history.reset(0);
        assert!(!history.can_undo() && !history.can_redo());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_cap(cap in 1usize..20, ops in prop::collection::vec(0u8..3, 0..200)) {
            let mut history: History<usize> = History::new(cap);
            for (i, op) in ops.into_iter().enumerate() {
                match op {
                    0 => { history.save(ActionKind::MoveActor, "op", i); }
                    1 => { history.undo(); }
                    _ => { history.redo(); }
                }
                prop_assert!(history.len() <= cap);
                if let Some(c) = history.cursor() {
                    prop_assert!(c < history.len());
                }
            }
        }

        #[test]
        fn prop_undo_then_redo_is_exact(states in prop::collection::vec(any::<u32>(), 1..30)) {
            let mut history: History<u32> = History::default();
            let mut previous = 0u32;
            for &s in &states {
                history.save(ActionKind::UpdateActor, "edit", s);
                prop_assert_eq!(history.undo(), Some(&previous));
                prop_assert_eq!(history.redo(), Some(&s));
                previous = s;
            }
        }
    }
}
