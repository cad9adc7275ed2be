//! Bounded command history with a recall cursor.

use std::collections::VecDeque;

/// Accepted command lines, oldest first.
///
/// The cursor is either unselected or an offset in `[-N, -1]` counted from
/// the most recent entry. Accepting a line always unselects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    capacity: usize,
    cursor: Option<usize>,
}

impl CommandHistory {
    /// Creates an empty history holding at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            cursor: None,
        }
    }

    /// Records an accepted line and unselects the cursor.
    ///
    /// A line equal to the most recent entry is not stored again; the
    /// oldest entry is evicted once capacity is reached. Returns whether
    /// the line was stored.
    pub fn push(&mut self, line: &str) -> bool {
        self.cursor = None;
        if self.capacity == 0 || self.entries.back().is_some_and(|last| last == line) {
            return false;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_owned());
        true
    }

    /// Most recently accepted line.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Number of stored lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Cursor as a negative offset from the end (`-1` is the most recent).
    #[must_use]
    pub fn cursor(&self) -> Option<isize> {
        self.cursor
            .and_then(|depth| isize::try_from(depth).ok())
            .map(|depth| -depth)
    }

    /// Moves one entry further into the past and returns it.
    ///
    /// Stays put at the oldest reachable entry.
    pub fn recall_back(&mut self) -> Option<&str> {
        let next = self.cursor.map_or(1, |depth| depth + 1);
        if next <= self.entries.len() && next <= self.capacity {
            self.cursor = Some(next);
        }
        self.selected()
    }

    /// Moves one entry towards the present and returns it.
    ///
    /// Stays put at the most recent entry; does nothing while unselected.
    pub fn recall_forward(&mut self) -> Option<&str> {
        if let Some(depth) = self.cursor {
            if depth > 1 {
                self.cursor = Some(depth - 1);
            }
        }
        self.selected()
    }

    /// Unselects the cursor without recording anything.
    pub const fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    fn selected(&self) -> Option<&str> {
        let depth = self.cursor?;
        self.entries
            .get(self.entries.len().checked_sub(depth)?)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::CommandHistory;

    fn with(lines: &[&str]) -> CommandHistory {
        let mut history = CommandHistory::new(500);
        for line in lines {
            history.push(line);
        }
        history
    }

    #[test]
    fn recall_walks_backwards_from_most_recent() {
        let mut history = with(&["A", "B", "C"]);
        assert_eq!(history.recall_back(), Some("C"));
        assert_eq!(history.cursor(), Some(-1));
        assert_eq!(history.recall_back(), Some("B"));
        assert_eq!(history.cursor(), Some(-2));
    }

    #[test]
    fn accepting_a_line_resets_the_cursor() {
        let mut history = with(&["A", "B", "C"]);
        history.recall_back();
        history.recall_back();
        history.push("D");
        assert_eq!(history.cursor(), None);
        assert_eq!(history.recall_back(), Some("D"));
    }

    #[test]
    fn recall_is_a_no_op_past_either_end() {
        let mut history = with(&["A", "B"]);
        assert_eq!(history.recall_forward(), None);
        history.recall_back();
        history.recall_back();
        assert_eq!(history.recall_back(), Some("A"));
        assert_eq!(history.cursor(), Some(-2));
        history.recall_forward();
        assert_eq!(history.recall_forward(), Some("B"));
        assert_eq!(history.cursor(), Some(-1));
    }

    #[test]
    fn consecutive_duplicates_are_suppressed() {
        let mut history = with(&["step", "step"]);
        assert_eq!(history.len(), 1);
        assert!(history.push("read 0"));
        assert!(history.push("step"));
        assert_eq!(history.iter().collect::<Vec<_>>(), ["step", "read 0", "step"]);
    }

    #[test]
    fn duplicate_still_resets_the_cursor() {
        let mut history = with(&["A", "B"]);
        history.recall_back();
        assert!(!history.push("B"));
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = CommandHistory::new(2);
        history.push("A");
        history.push("B");
        history.push("C");
        assert_eq!(history.iter().collect::<Vec<_>>(), ["B", "C"]);
        history.recall_back();
        history.recall_back();
        assert_eq!(history.recall_back(), Some("B"));
    }

    #[test]
    fn empty_history_recalls_nothing() {
        let mut history = CommandHistory::new(4);
        assert_eq!(history.recall_back(), None);
        assert_eq!(history.cursor(), None);
        assert!(history.last().is_none());
    }

    #[test]
    fn reset_cursor_unselects() {
        let mut history = with(&["A"]);
        history.recall_back();
        history.reset_cursor();
        assert_eq!(history.cursor(), None);
    }
}
