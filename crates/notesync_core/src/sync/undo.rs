//! Undo window for the most recent note deletion.
//!
//! # Invariants
//! - At most one deletion is restorable at a time; a newer one replaces it.
//! - A taken or expired entry can never be restored twice.

use crate::model::note::Note;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct PendingRestore {
    note: Note,
    expires_at: Instant,
}

/// Remembers the last deleted note for a bounded time.
#[derive(Debug, Clone)]
pub struct UndoWindow {
    window: Duration,
    pending: Option<PendingRestore>,
}

impl UndoWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Records `note` as restorable until `now + window`.
    pub fn arm(&mut self, note: Note, now: Instant) {
        self.pending = Some(PendingRestore {
            note,
            expires_at: now + self.window,
        });
    }

    /// Returns the note if one is pending and still inside the window.
    pub fn peek(&self, now: Instant) -> Option<&Note> {
        self.pending
            .as_ref()
            .filter(|pending| now < pending.expires_at)
            .map(|pending| &pending.note)
    }

    /// Removes and returns the pending note if still inside the window.
    ///
    /// An expired entry is dropped as a side effect.
    pub fn take(&mut self, now: Instant) -> Option<Note> {
        let pending = self.pending.take()?;
        (now < pending.expires_at).then_some(pending.note)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Time left before the pending entry expires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|pending| pending.expires_at.saturating_duration_since(now))
            .filter(|left| !left.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::UndoWindow;
    use crate::model::note::Note;
    use std::time::{Duration, Instant};

    #[test]
    fn take_within_window_returns_note_once() {
        let mut undo = UndoWindow::new(Duration::from_secs(5));
        let now = Instant::now();
        undo.arm(Note::with_id("n1"), now);

        assert_eq!(
            undo.remaining(now + Duration::from_secs(1)),
            Some(Duration::from_secs(4))
        );
        let restored = undo.take(now + Duration::from_secs(1)).expect("inside window");
        assert_eq!(restored.id, "n1");
        assert!(undo.take(now).is_none());
    }

    #[test]
    fn expired_entries_are_dropped() {
        let mut undo = UndoWindow::new(Duration::from_millis(10));
        let now = Instant::now();
        undo.arm(Note::with_id("n1"), now);

        let later = now + Duration::from_millis(10);
        assert!(undo.peek(later).is_none());
        assert!(undo.remaining(later).is_none());
        assert!(undo.take(later).is_none());
    }

    #[test]
    fn newer_deletion_replaces_older() {
        let mut undo = UndoWindow::new(Duration::from_secs(5));
        let now = Instant::now();
        undo.arm(Note::with_id("old"), now);
        undo.arm(Note::with_id("new"), now);
        assert_eq!(undo.peek(now).map(|note| note.id.as_str()), Some("new"));
    }
}
