//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by local storage and sync.
//! - Provide lifecycle helpers for sync-state flags.
//!
//! # Invariants
//! - `id` is client-generated once and never regenerated on update.
//! - `locally_deleted` notes are excluded from every active listing.
//! - `connected == false` means the current local revision has not been
//!   confirmed by the remote service.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable note identifier, shared by local and remote stores.
///
/// Kept as a string so ids minted by other clients of the same service are
/// accepted verbatim.
pub type NoteId = String;

/// Labels offered by the note editor.
pub const DEFAULT_LABELS: &[&str] = &[
    "Random",
    "Code",
    "Todo",
    "Work",
    "Design",
    "Travel",
    "Routine",
    "Important",
    "Hobbies",
    "Household",
    "Blog",
];

/// One todo-list entry of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub content: String,
    pub checked: bool,
}

impl Checkpoint {
    pub fn new(content: impl Into<String>, checked: bool) -> Self {
        Self {
            content: content.into(),
            checked,
        }
    }
}

/// Validation failure for user-authored note input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is missing or blank.
    EmptyTitle,
    /// Neither description nor checkpoints carry content.
    EmptyBody,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
            Self::EmptyBody => {
                write!(f, "note needs a description or at least one checkpoint")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Join key for local/remote reconciliation.
    pub id: NoteId,
    pub title: Option<String>,
    pub description: Option<String>,
    /// 32-bit ARGB color value.
    pub color: Option<i32>,
    pub label: Option<String>,
    /// Last-modified time in epoch milliseconds.
    pub timestamp: i64,
    /// Remote reads require the owner's safe password when set.
    pub locked: bool,
    pub checkpoints: Vec<Checkpoint>,
    /// Set once the remote service confirmed this revision.
    pub connected: bool,
    /// Soft-delete marker awaiting remote deletion.
    pub locally_deleted: bool,
}

impl Note {
    /// Creates an empty, local-only note with a generated id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates an empty note for a caller-provided id.
    ///
    /// Used by import and pull paths where the id already exists remotely.
    pub fn with_id(id: impl Into<NoteId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            color: None,
            label: None,
            timestamp: now_epoch_ms(),
            locked: false,
            checkpoints: Vec::new(),
            connected: false,
            locally_deleted: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn color(mut self, color: i32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn checkpoint(mut self, content: impl Into<String>, checked: bool) -> Self {
        self.checkpoints.push(Checkpoint::new(content, checked));
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Checks the editor-level save rule.
    ///
    /// The sync engine does not call this; callers gate user input with it.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if is_blank(self.title.as_deref()) {
            return Err(NoteValidationError::EmptyTitle);
        }
        if is_blank(self.description.as_deref()) && self.checkpoints.is_empty() {
            return Err(NoteValidationError::EmptyBody);
        }
        Ok(())
    }

    /// Returns whether this note belongs in the active listing.
    pub fn is_active(&self) -> bool {
        !self.locally_deleted
    }

    /// Returns a copy without password-gated content.
    ///
    /// Keeps the fields needed to render a list entry.
    pub fn redacted(&self) -> Self {
        Self {
            description: None,
            checkpoints: Vec::new(),
            ..self.clone()
        }
    }

    /// Bumps `timestamp` to the current time.
    pub fn touch(&mut self) {
        self.timestamp = now_epoch_ms();
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}
