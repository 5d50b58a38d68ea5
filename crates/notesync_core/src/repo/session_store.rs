//! Persisted session contract.
//!
//! Keeps the signed-in token and profile across process restarts.

use crate::repo::note_store::RepoResult;
use crate::session::SessionState;

/// Storage for at most one signed-in session.
pub trait SessionStore: Send + Sync {
    fn load_session(&self) -> RepoResult<Option<SessionState>>;
    /// Replaces any previously stored session.
    fn save_session(&self, state: &SessionState) -> RepoResult<()>;
    fn clear_session(&self) -> RepoResult<()>;
}
