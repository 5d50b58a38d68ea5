//! SQLite implementation of the note and session stores.
//!
//! # Responsibility
//! - Map `Note` records to the `notes` table and session state to `session`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - The connection mutex is never held across an `.await` by callers; every
//!   method is a short synchronous critical section.
//! - `remote_known` only ever flips from 0 to 1 while a row exists.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Checkpoint, Note};
use crate::model::user::Profile;
use crate::repo::note_store::{NoteStore, RepoError, RepoResult};
use crate::repo::session_store::SessionStore;
use crate::session::SessionState;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    color,
    label,
    timestamp,
    locked,
    checkpoints,
    connected,
    locally_deleted
FROM notes";

/// SQLite-backed local store shared by the sync engine and account service.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::Poisoned)
    }

    fn query_notes(&self, filter: &str) -> RepoResult<Vec<Note>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE {filter} ORDER BY timestamp DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NoteStore for SqliteStore {
    fn insert_or_replace(&self, note: &Note) -> RepoResult<()> {
        let checkpoints = serde_json::to_string(&note.checkpoints)
            .map_err(|err| RepoError::InvalidData(format!("unserializable checkpoints: {err}")))?;

        self.conn()?.execute(
            "INSERT INTO notes (
                id,
                title,
                description,
                color,
                label,
                timestamp,
                locked,
                checkpoints,
                connected,
                locally_deleted,
                remote_known
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                color = excluded.color,
                label = excluded.label,
                timestamp = excluded.timestamp,
                locked = excluded.locked,
                checkpoints = excluded.checkpoints,
                connected = excluded.connected,
                locally_deleted = excluded.locally_deleted,
                remote_known = MAX(notes.remote_known, excluded.remote_known);",
            params![
                note.id.as_str(),
                note.title.as_deref(),
                note.description.as_deref(),
                note.color,
                note.label.as_deref(),
                note.timestamp,
                bool_to_int(note.locked),
                checkpoints,
                bool_to_int(note.connected),
                bool_to_int(note.locally_deleted),
            ],
        )?;
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Option<Note>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn hard_delete(&self, id: &str) -> RepoResult<bool> {
        let changed = self
            .conn()?
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn soft_delete(&self, id: &str) -> RepoResult<bool> {
        let changed = self.conn()?.execute(
            "UPDATE notes SET locally_deleted = 1 WHERE id = ?1;",
            [id],
        )?;
        Ok(changed > 0)
    }

    fn list_active(&self) -> RepoResult<Vec<Note>> {
        self.query_notes("locally_deleted = 0")
    }

    fn list_unconnected(&self) -> RepoResult<Vec<Note>> {
        self.query_notes("connected = 0 AND locally_deleted = 0")
    }

    fn list_soft_deleted(&self) -> RepoResult<Vec<Note>> {
        self.query_notes("locally_deleted = 1")
    }

    fn mark_locked(&self, id: &str, locked: bool) -> RepoResult<bool> {
        let changed = self.conn()?.execute(
            "UPDATE notes SET locked = ?2 WHERE id = ?1;",
            params![id, bool_to_int(locked)],
        )?;
        Ok(changed > 0)
    }

    fn is_remote_known(&self, id: &str) -> RepoResult<bool> {
        let known: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT remote_known FROM notes WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(known == Some(1))
    }
}

impl SessionStore for SqliteStore {
    fn load_session(&self) -> RepoResult<Option<SessionState>> {
        let state = self
            .conn()?
            .query_row(
                "SELECT token, name, email, image_url FROM session WHERE slot = 1;",
                [],
                |row| {
                    Ok(SessionState {
                        token: row.get("token")?,
                        profile: Profile {
                            name: row.get("name")?,
                            email: row.get("email")?,
                            image_url: row.get("image_url")?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    fn save_session(&self, state: &SessionState) -> RepoResult<()> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO session (slot, token, name, email, image_url)
             VALUES (1, ?1, ?2, ?3, ?4);",
            params![
                state.token.as_str(),
                state.profile.name.as_str(),
                state.profile.email.as_str(),
                state.profile.image_url.as_str(),
            ],
        )?;
        Ok(())
    }

    fn clear_session(&self) -> RepoResult<()> {
        self.conn()?.execute("DELETE FROM session;", [])?;
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: String = row.get("id")?;
    let checkpoints_json: String = row.get("checkpoints")?;
    let checkpoints: Vec<Checkpoint> = serde_json::from_str(&checkpoints_json).map_err(|err| {
        RepoError::InvalidData(format!("invalid checkpoints for note `{id}`: {err}"))
    })?;

    Ok(Note {
        title: row.get("title")?,
        description: row.get("description")?,
        color: row.get("color")?,
        label: row.get("label")?,
        timestamp: row.get("timestamp")?,
        locked: parse_flag(row, "locked", &id)?,
        checkpoints,
        connected: parse_flag(row, "connected", &id)?,
        locally_deleted: parse_flag(row, "locally_deleted", &id)?,
        id,
    })
}

fn parse_flag(row: &Row<'_>, column: &str, id: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` for note `{id}`"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
