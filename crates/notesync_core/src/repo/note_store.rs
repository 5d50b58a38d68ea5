//! Local note store contract.
//!
//! # Responsibility
//! - Define the persistence API the sync engine reconciles against.
//!
//! # Invariants
//! - `list_active` never returns soft-deleted notes.
//! - `insert_or_replace` is keyed by `Note::id` and replaces every column.
//! - `soft_delete` and `hard_delete` are idempotent for unknown ids.

use crate::db::DbError;
use crate::model::note::Note;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for local persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A stored row cannot be mapped back into the domain model.
    InvalidData(String),
    /// The store lock was poisoned by a panicking writer.
    Poisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::Poisoned => write!(f, "local store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable per-device note storage.
pub trait NoteStore: Send + Sync {
    /// Inserts the note or replaces the row with the same id.
    fn insert_or_replace(&self, note: &Note) -> RepoResult<()>;
    /// Gets one note by id, including soft-deleted rows.
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Note>>;
    /// Removes the row. Returns whether a row existed.
    fn hard_delete(&self, id: &str) -> RepoResult<bool>;
    /// Sets the soft-delete marker. Returns whether a row existed.
    fn soft_delete(&self, id: &str) -> RepoResult<bool>;
    /// Lists notes without the soft-delete marker, newest first.
    fn list_active(&self) -> RepoResult<Vec<Note>>;
    /// Lists notes whose current revision is not confirmed remotely.
    ///
    /// Soft-deleted rows are left to the delete backlog.
    fn list_unconnected(&self) -> RepoResult<Vec<Note>>;
    /// Lists notes awaiting remote deletion.
    fn list_soft_deleted(&self) -> RepoResult<Vec<Note>>;
    /// Updates only the lock flag. Returns whether a row existed.
    fn mark_locked(&self, id: &str, locked: bool) -> RepoResult<bool>;
    /// Returns whether any revision of this note was ever confirmed remotely.
    ///
    /// Unlike `Note::connected`, later local edits do not reset this.
    fn is_remote_known(&self, id: &str) -> RepoResult<bool>;
}

