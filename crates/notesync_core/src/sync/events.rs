//! Change notifications published after local mutations.

use crate::model::note::NoteId;
use log::trace;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// What changed in the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteChange {
    /// A row was inserted or rewritten.
    Upserted(NoteId),
    /// A row was soft- or hard-deleted and left the active listing.
    Deleted(NoteId),
    /// Many rows changed at once; re-query the active listing.
    Reloaded,
}

/// Fan-out publisher for [`NoteChange`] events.
///
/// Publishing never blocks and never fails; lagging receivers observe
/// `RecvError::Lagged` and should re-query.
#[derive(Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<NoteChange>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NoteChange> {
        self.sender.subscribe()
    }

    pub fn publish(&self, change: NoteChange) {
        // Err only means nobody is listening.
        if self.sender.send(change).is_err() {
            trace!("event=change_publish module=sync status=skipped reason=no_receivers");
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
