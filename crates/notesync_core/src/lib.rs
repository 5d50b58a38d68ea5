//! Offline-first note synchronization core.
//!
//! Local SQLite storage is the source of truth for the UI; the remote
//! service is reconciled through [`SyncEngine`].

pub mod config;
pub mod connectivity;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod search;
pub mod service;
pub mod session;
pub mod sync;

pub use config::{ClientConfig, ConfigError};
pub use connectivity::{Connectivity, NetworkMonitor};
pub use logging::{default_log_level, effective_log_level, init_logging, logging_status};
pub use model::note::{Checkpoint, Note, NoteId, NoteValidationError, DEFAULT_LABELS};
pub use model::user::{AuthPayload, LoginUser, Profile, RegisterUser, UpdateProfile};
pub use remote::client::{RemoteClient, RemoteError, RemoteResult};
pub use remote::http::HttpRemoteClient;
pub use repo::note_store::{NoteStore, RepoError, RepoResult};
pub use repo::session_store::SessionStore;
pub use repo::sqlite_store::SqliteStore;
pub use search::notes::{group_by_label, search_notes};
pub use service::account_service::AccountService;
pub use session::{Session, SessionState};
pub use sync::engine::{Confirmation, SyncEngine, SyncReport};
pub use sync::error::{SyncError, SyncResult};
pub use sync::events::NoteChange;
pub use sync::undo::UndoWindow;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
