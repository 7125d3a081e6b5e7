//! Snapshot undo/redo history for the editing session.
//!
//! Every committed change stores the whole serialized document. Snapshots
//! are small (an email body) and restoring one is a plain reparse, so there
//! is no operation log to invert.

use std::collections::VecDeque;

/// Default number of retained snapshots
pub const DEFAULT_MAX_SIZE: usize = 50;

/// Linear snapshot history with a cursor.
///
/// Always holds at least one snapshot and `index` always points at one of
/// them; the snapshot at `index` is the current document.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<String>,
    index: usize,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// History holding only the empty document, default max size
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    /// History holding only the empty document. `max_size` is at least 1.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            snapshots: VecDeque::from([String::new()]),
            index: 0,
            max_size: max_size.max(1),
        }
    }

    /// Record a new current snapshot.
    ///
    /// Identical to the current snapshot: nothing happens. Otherwise any
    /// redo branch is dropped and, past the size limit, the oldest snapshot
    /// is evicted. Returns whether the history changed.
    pub fn push(&mut self, snapshot: impl Into<String>) -> bool {
        let snapshot = snapshot.into();
        if self.snapshots[self.index] == snapshot {
            return false;
        }
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push_back(snapshot);
        self.index += 1;

        while self.snapshots.len() > self.max_size {
            self.snapshots.pop_front();
            self.index -= 1;
        }
        true
    }

    /// Step back; `None` at the oldest snapshot
    pub fn undo(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    /// Step forward; `None` at the newest snapshot
    pub fn redo(&mut self) -> Option<&str> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    /// Forget everything; `snapshot` becomes the only entry
    pub fn reset(&mut self, snapshot: impl Into<String>) {
        self.snapshots.clear();
        self.snapshots.push_back(snapshot.into());
        self.index = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.index]
    }

    /// Number of retained snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false, a history holds at least one snapshot
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Change the limit, evicting the oldest snapshots if needed
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.snapshots.len() > self.max_size {
            if self.index == 0 {
                // Keep the current snapshot, drop from the redo end instead
                self.snapshots.pop_back();
            } else {
                self.snapshots.pop_front();
                self.index -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_with_empty_document() {
        let history = History::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), "");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_undo_redo() {
        let mut history = History::new();
        history.reset("<p>a</p>");
        history.push("<p>ab</p>");
        history.push("<p>abc</p>");

        assert_eq!(history.undo(), Some("<p>ab</p>"));
        assert_eq!(history.undo(), Some("<p>a</p>"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.index(), 0);

        assert_eq!(history.redo(), Some("<p>ab</p>"));
        assert_eq!(history.redo(), Some("<p>abc</p>"));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_history_push_identical_is_noop() {
        let mut history = History::new();
        history.reset("<p>a</p>");
        assert!(!history.push("<p>a</p>"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_history_push_clears_redo() {
        let mut history = History::new();
        history.reset("a");
        history.push("b");
        history.push("c");
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.push("d");
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), "d");
    }

    #[test]
    fn test_history_max_size() {
        let mut history = History::with_max_size(3);
        history.reset("0");
        for i in 1..5 {
            history.push(i.to_string());
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.undo(), Some("3"));
        assert_eq!(history.undo(), Some("2"));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_history_evicts_in_order_over_many_pushes() {
        let mut history = History::with_max_size(4);
        for i in 0..10_000 {
            history.push(i.to_string());
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.current(), "9999");
        assert_eq!(history.undo(), Some("9998"));
        assert_eq!(history.undo(), Some("9997"));
        assert_eq!(history.undo(), Some("9996"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some("9997"));
    }

    #[test]
    fn test_history_max_size_at_least_one() {
        let mut history = History::with_max_size(0);
        history.push("a");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), "a");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_set_max_size_evicts_oldest() {
        let mut history = History::new();
        for s in ["a", "b", "c", "d"] {
            history.push(s);
        }
        history.set_max_size(2);
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), "d");
        assert_eq!(history.undo(), Some("c"));
    }
}
