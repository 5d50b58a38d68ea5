//! Offline-first note sync engine.
//!
//! # Responsibility
//! - Write every note change to the local store first.
//! - Push changes to the remote service when a session and network exist.
//! - Drain delete/create/update backlogs and pull the remote snapshot.
//!
//! # Invariants
//! - Unlocked notes are persisted locally before any remote call.
//! - Content of an already-locked note is only cached as a redacted stub,
//!   whichever path wrote it; it is read back through `fetch_locked`.
//! - A soft-deleted row is hard-deleted only after the remote confirmed the
//!   deletion, or when no revision of it ever reached the remote.
//! - No store lock is held across a remote call.
//! - Batch operations (`sync_all`, `pull_remote`) never return errors.

use crate::connectivity::Connectivity;
use crate::model::note::Note;
use crate::remote::client::RemoteClient;
use crate::remote::types::{RemoteNote, SafePassword};
use crate::repo::note_store::{NoteStore, RepoResult};
use crate::session::Session;
use crate::sync::error::{SyncError, SyncResult};
use crate::sync::events::{ChangeFeed, NoteChange};
use crate::sync::undo::UndoWindow;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Successful outcome of a single-note operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Applied to the local store only; the remote was not contacted.
    LocalOnly,
    /// Applied locally and confirmed by the remote service.
    Synced,
    /// Nothing to do (e.g. deleting an unknown id).
    Unchanged,
}

impl Confirmation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalOnly => "local_only",
            Self::Synced => "synced",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Counters of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// The run did nothing because there was no session or network.
    pub skipped: bool,
    /// The run stopped early on cancellation.
    pub cancelled: bool,
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
    pub pulled: usize,
    pub failed: usize,
}

impl SyncReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

enum RemoteGate {
    NoSession,
    Offline,
    Ready(String),
}

/// Reconciles the local store with the remote service.
pub struct SyncEngine<S: NoteStore> {
    store: Arc<S>,
    remote: Arc<dyn RemoteClient>,
    session: Arc<Session>,
    connectivity: Arc<dyn Connectivity>,
    changes: ChangeFeed,
}

impl<S: NoteStore> SyncEngine<S> {
    pub fn new(
        store: Arc<S>,
        remote: Arc<dyn RemoteClient>,
        session: Arc<Session>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            store,
            remote,
            session,
            connectivity,
            changes: ChangeFeed::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Subscribes to local change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<NoteChange> {
        self.changes.subscribe()
    }

    /// Active notes, newest first.
    pub fn list_active(&self) -> SyncResult<Vec<Note>> {
        Ok(self.store.list_active()?)
    }

    /// Local copy of one note, including soft-deleted rows.
    pub fn get_note(&self, id: &str) -> SyncResult<Option<Note>> {
        Ok(self.store.get_by_id(id)?)
    }

    /// Saves a new note and pushes it when possible.
    ///
    /// Locked notes need a session and network up front and are never
    /// written locally before the remote accepted them.
    pub async fn create_note(
        &self,
        note: Note,
        safe_password: Option<&str>,
    ) -> SyncResult<Confirmation> {
        let started_at = Instant::now();
        let note_id = note.id.clone();
        let result = self.create_note_inner(note, safe_password).await;
        log_outcome("note_create", &note_id, started_at, &result);
        result
    }

    /// Saves an edited note and pushes it when possible.
    ///
    /// `note.locked == true` on a previously unlocked note requests a lock:
    /// the content update runs first, then a separate remote lock call. A
    /// lock that cannot be applied yields `LockFailed` and leaves the update
    /// in place.
    ///
    /// A note that was locked and stays locked needs a session and network:
    /// its full content goes to the remote only, and the local row keeps a
    /// redacted stub. Callers edit such notes from a `fetch_locked` copy.
    pub async fn update_note(
        &self,
        note: Note,
        safe_password: Option<&str>,
    ) -> SyncResult<Confirmation> {
        let started_at = Instant::now();
        let note_id = note.id.clone();
        let result = self.update_note_inner(note, safe_password).await;
        log_outcome("note_update", &note_id, started_at, &result);
        result
    }

    /// Deletes a note locally and remotely.
    ///
    /// The soft-delete marker stays when the remote cannot be reached, so a
    /// later `sync_all` retries.
    pub async fn delete_note(&self, id: &str) -> SyncResult<Confirmation> {
        let started_at = Instant::now();
        let result = self.delete_note_inner(id).await;
        log_outcome("note_delete", id, started_at, &result);
        result
    }

    /// Deletes a note and arms `undo` with its last local copy.
    pub async fn delete_with_undo(
        &self,
        id: &str,
        undo: &mut UndoWindow,
    ) -> SyncResult<Confirmation> {
        let existing = self.store.get_by_id(id)?;
        let result = self.delete_note(id).await;
        if let Some(note) = existing.filter(Note::is_active) {
            if self.left_active_listing(id) {
                undo.arm(note, Instant::now());
            }
        }
        result
    }

    /// Restores the note held by `undo` through `create_note`.
    pub async fn undo_delete(&self, undo: &mut UndoWindow) -> SyncResult<Confirmation> {
        let note = undo
            .take(Instant::now())
            .ok_or(SyncError::InvalidRequest("no deleted note to restore"))?;
        if note.locked {
            return Err(SyncError::InvalidRequest("locked notes cannot be restored"));
        }
        self.create_note(note, None).await
    }

    /// Reads a locked note through the password-gated remote call.
    ///
    /// The result is never written to the local store.
    pub async fn fetch_locked(&self, id: &str, safe_password: &str) -> SyncResult<Note> {
        let token = self.require_remote()?;
        let response = self
            .remote
            .get_locked_note(&token, id, &SafePassword::new(safe_password))
            .await?;
        if !response.success {
            info!(
                "event=note_fetch_locked module=sync status=error note_id={} error_code=unauthorized",
                id
            );
            return Err(SyncError::Unauthorized(response.message));
        }
        let note = response
            .data
            .ok_or_else(|| SyncError::Unexpected("locked note response carried no note".into()))?;
        Ok(note.into_note())
    }

    /// Drains the delete, create and update backlogs.
    pub async fn sync_all(&self) -> SyncReport {
        self.sync_all_with_cancel(&CancellationToken::new()).await
    }

    /// Same as [`Self::sync_all`], checking `cancel` before every note.
    pub async fn sync_all_with_cancel(&self, cancel: &CancellationToken) -> SyncReport {
        if !matches!(self.remote_gate(), RemoteGate::Ready(_)) {
            debug!("event=sync_all module=sync status=skipped");
            return SyncReport::skipped();
        }

        let started_at = Instant::now();
        let mut report = SyncReport::default();

        for note in self.backlog("soft_deleted", S::list_soft_deleted, &mut report) {
            if cancel.is_cancelled() {
                return self.finish_cancelled(report);
            }
            match self.delete_note(&note.id).await {
                Ok(_) => report.deleted += 1,
                Err(_) => report.failed += 1,
            }
        }

        // Locked rows hold a redacted stub. Pushing it, as a create or an
        // update, would overwrite the remote content.
        for note in self.backlog("unconnected", S::list_unconnected, &mut report) {
            if note.locked {
                continue;
            }
            if cancel.is_cancelled() {
                return self.finish_cancelled(report);
            }
            match self.create_note(note, None).await {
                Ok(_) => report.created += 1,
                Err(_) => report.failed += 1,
            }
        }

        // Re-queried after the create pass: only notes whose create failed
        // are left.
        for note in self.backlog("unconnected", S::list_unconnected, &mut report) {
            if note.locked {
                continue;
            }
            if cancel.is_cancelled() {
                return self.finish_cancelled(report);
            }
            match self.update_note(note, None).await {
                Ok(_) => report.updated += 1,
                Err(_) => report.failed += 1,
            }
        }

        info!(
            "event=sync_all module=sync status=ok deleted={} created={} updated={} failed={} duration_ms={}",
            report.deleted,
            report.created,
            report.updated,
            report.failed,
            started_at.elapsed().as_millis()
        );
        report
    }

    /// Overwrites local rows with the remote snapshot.
    ///
    /// Remote wins for every id it returns; local rows unknown to the remote
    /// are left alone.
    pub async fn pull_remote(&self) -> SyncReport {
        let token = match self.remote_gate() {
            RemoteGate::Ready(token) => token,
            _ => {
                debug!("event=pull_remote module=sync status=skipped");
                return SyncReport::skipped();
            }
        };

        let started_at = Instant::now();
        let mut report = SyncReport::default();
        let response = match self.remote.list_notes(&token).await {
            Ok(response) if response.success => response,
            Ok(response) => {
                warn!(
                    "event=pull_remote module=sync status=error error_code=remote_rejected error={}",
                    response.message
                );
                report.failed += 1;
                return report;
            }
            Err(err) => {
                warn!(
                    "event=pull_remote module=sync status=error error_code={} error={}",
                    SyncError::from(err.clone()).code(),
                    err
                );
                report.failed += 1;
                return report;
            }
        };

        for remote_note in response.data.unwrap_or_default() {
            let note = remote_note.into_note();
            let note = if note.locked { note.redacted() } else { note };
            match self.store.insert_or_replace(&note) {
                Ok(()) => report.pulled += 1,
                Err(err) => {
                    warn!(
                        "event=pull_remote module=sync status=error note_id={} error={}",
                        note.id, err
                    );
                    report.failed += 1;
                }
            }
        }
        self.changes.publish(NoteChange::Reloaded);

        info!(
            "event=pull_remote module=sync status=ok pulled={} failed={} duration_ms={}",
            report.pulled,
            report.failed,
            started_at.elapsed().as_millis()
        );
        report
    }

    async fn create_note_inner(
        &self,
        mut note: Note,
        safe_password: Option<&str>,
    ) -> SyncResult<Confirmation> {
        note.connected = false;
        note.locally_deleted = false;

        if note.locked {
            let token = self.require_remote()?;
            return self.push_create(&token, note, safe_password).await;
        }

        self.write_local(&note)?;
        let token = match self.remote_gate() {
            RemoteGate::NoSession => return Ok(Confirmation::LocalOnly),
            RemoteGate::Offline => return Err(SyncError::Offline),
            RemoteGate::Ready(token) => token,
        };
        self.push_create(&token, note, safe_password).await
    }

    async fn push_create(
        &self,
        token: &str,
        note: Note,
        safe_password: Option<&str>,
    ) -> SyncResult<Confirmation> {
        let ack = self
            .remote
            .create_note(token, &RemoteNote::from_note(&note, safe_password))
            .await?;
        if !ack.success {
            return Err(SyncError::RemoteRejected(ack.message));
        }

        let mut confirmed = if note.locked { note.redacted() } else { note };
        confirmed.connected = true;
        self.write_local(&confirmed)?;
        Ok(Confirmation::Synced)
    }

    async fn update_note_inner(
        &self,
        mut note: Note,
        safe_password: Option<&str>,
    ) -> SyncResult<Confirmation> {
        let prior_locked = self
            .store
            .get_by_id(&note.id)?
            .is_some_and(|prior| prior.locked);
        let lock_password = if note.locked && !prior_locked {
            Some(safe_password.ok_or(SyncError::InvalidRequest(
                "a safe password is required to lock a note",
            ))?)
        } else {
            None
        };

        if prior_locked && note.locked {
            let token = self.require_remote()?;
            return self.push_locked_update(&token, note, safe_password).await;
        }

        // The lock itself is applied by the dedicated remote call.
        if lock_password.is_some() {
            note.locked = false;
        }
        note.connected = false;
        note.locally_deleted = false;
        self.write_local(&note)?;

        let token = match self.remote_gate() {
            RemoteGate::NoSession if lock_password.is_some() => {
                return Err(SyncError::LockFailed(Box::new(SyncError::Unauthenticated)));
            }
            RemoteGate::NoSession => return Ok(Confirmation::LocalOnly),
            RemoteGate::Offline if lock_password.is_some() => {
                return Err(SyncError::LockFailed(Box::new(SyncError::Offline)));
            }
            RemoteGate::Offline => return Err(SyncError::Offline),
            RemoteGate::Ready(token) => token,
        };

        let ack = self
            .remote
            .update_note(&token, &RemoteNote::from_note(&note, None))
            .await?;
        if !ack.success {
            return Err(SyncError::RemoteRejected(ack.message));
        }
        note.connected = true;
        self.write_local(&note)?;

        if let Some(password) = lock_password {
            self.apply_lock(&token, &note.id, password)
                .await
                .map_err(|err| SyncError::LockFailed(Box::new(err)))?;
        }
        Ok(Confirmation::Synced)
    }

    async fn push_locked_update(
        &self,
        token: &str,
        note: Note,
        safe_password: Option<&str>,
    ) -> SyncResult<Confirmation> {
        let ack = self
            .remote
            .update_note(token, &RemoteNote::from_note(&note, safe_password))
            .await?;
        if !ack.success {
            return Err(SyncError::RemoteRejected(ack.message));
        }

        let mut stub = note.redacted();
        stub.connected = true;
        stub.locally_deleted = false;
        self.write_local(&stub)?;
        Ok(Confirmation::Synced)
    }

    async fn apply_lock(&self, token: &str, id: &str, safe_password: &str) -> SyncResult<()> {
        let ack = self
            .remote
            .set_lock(token, id, &SafePassword::new(safe_password))
            .await?;
        if !ack.success {
            return Err(SyncError::RemoteRejected(ack.message));
        }
        self.store.mark_locked(id, true)?;
        self.changes.publish(NoteChange::Upserted(id.to_string()));
        Ok(())
    }

    async fn delete_note_inner(&self, id: &str) -> SyncResult<Confirmation> {
        if self.store.get_by_id(id)?.is_none() {
            return Ok(Confirmation::Unchanged);
        }

        self.store.soft_delete(id)?;
        self.changes.publish(NoteChange::Deleted(id.to_string()));

        let remote_known = self.store.is_remote_known(id)?;
        let token = match self.remote_gate() {
            _ if !remote_known => return self.hard_delete_local(id),
            RemoteGate::NoSession => return self.hard_delete_local(id),
            RemoteGate::Offline => return Err(SyncError::Offline),
            RemoteGate::Ready(token) => token,
        };

        let ack = self.remote.delete_note(&token, id).await?;
        if !ack.success {
            return Err(SyncError::RemoteRejected(ack.message));
        }
        self.store.hard_delete(id)?;
        Ok(Confirmation::Synced)
    }

    fn hard_delete_local(&self, id: &str) -> SyncResult<Confirmation> {
        self.store.hard_delete(id)?;
        Ok(Confirmation::LocalOnly)
    }

    fn write_local(&self, note: &Note) -> SyncResult<()> {
        self.store.insert_or_replace(note)?;
        self.changes.publish(NoteChange::Upserted(note.id.clone()));
        Ok(())
    }

    /// Token for operations that cannot fall back to local-only mode.
    fn require_remote(&self) -> SyncResult<String> {
        match self.remote_gate() {
            RemoteGate::NoSession => Err(SyncError::Unauthenticated),
            RemoteGate::Offline => Err(SyncError::Offline),
            RemoteGate::Ready(token) => Ok(token),
        }
    }

    /// Whether `id` is soft-deleted or gone. A failed read counts as still
    /// active.
    fn left_active_listing(&self, id: &str) -> bool {
        match self.store.get_by_id(id) {
            Ok(Some(note)) => !note.is_active(),
            Ok(None) => true,
            Err(_) => false,
        }
    }

    fn remote_gate(&self) -> RemoteGate {
        match self.session.token() {
            None => RemoteGate::NoSession,
            Some(_) if !self.connectivity.is_online() => RemoteGate::Offline,
            Some(token) => RemoteGate::Ready(token),
        }
    }

    fn backlog(
        &self,
        name: &'static str,
        query: fn(&S) -> RepoResult<Vec<Note>>,
        report: &mut SyncReport,
    ) -> Vec<Note> {
        match query(self.store.as_ref()) {
            Ok(notes) => {
                debug!(
                    "event=sync_backlog module=sync backlog={} size={}",
                    name,
                    notes.len()
                );
                notes
            }
            Err(err) => {
                warn!(
                    "event=sync_backlog module=sync status=error backlog={} error={}",
                    name, err
                );
                report.failed += 1;
                Vec::new()
            }
        }
    }

    fn finish_cancelled(&self, mut report: SyncReport) -> SyncReport {
        report.cancelled = true;
        info!(
            "event=sync_all module=sync status=cancelled deleted={} created={} updated={} failed={}",
            report.deleted, report.created, report.updated, report.failed
        );
        report
    }
}

fn log_outcome(event: &str, note_id: &str, started_at: Instant, result: &SyncResult<Confirmation>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(confirmation) => info!(
            "event={} module=sync status=ok note_id={} outcome={} duration_ms={}",
            event,
            note_id,
            confirmation.as_str(),
            duration_ms
        ),
        Err(err) => warn!(
            "event={} module=sync status=error note_id={} error_code={} duration_ms={} error={}",
            event,
            note_id,
            err.code(),
            duration_ms,
            err
        ),
    }
}
