//! Sync engine error taxonomy.

use crate::remote::client::RemoteError;
use crate::repo::note_store::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Error returned by engine and account operations.
#[derive(Debug)]
pub enum SyncError {
    /// No network reachability.
    Offline,
    /// No session token.
    Unauthenticated,
    /// The service answered `success = false`.
    RemoteRejected(String),
    /// The service refused a password-gated read.
    Unauthorized(String),
    /// The note update succeeded but the follow-up lock call failed.
    LockFailed(Box<SyncError>),
    /// The caller's request cannot be executed as given.
    InvalidRequest(&'static str),
    /// Storage, serialization or transport failure.
    Unexpected(Box<dyn Error + Send + Sync>),
}

impl SyncError {
    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Unauthenticated => "unauthenticated",
            Self::RemoteRejected(_) => "remote_rejected",
            Self::Unauthorized(_) => "unauthorized",
            Self::LockFailed(_) => "lock_failed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => write!(f, "no internet connection"),
            Self::Unauthenticated => write!(f, "user not logged in"),
            Self::RemoteRejected(message) => write!(f, "{message}"),
            Self::Unauthorized(message) => write!(f, "unauthorized: {message}"),
            Self::LockFailed(cause) => write!(f, "note saved but could not be locked: {cause}"),
            Self::InvalidRequest(details) => write!(f, "invalid request: {details}"),
            Self::Unexpected(err) => write!(f, "unexpected error: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LockFailed(cause) => Some(cause.as_ref()),
            Self::Unexpected(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Unexpected(Box::new(value))
    }
}

impl From<RemoteError> for SyncError {
    fn from(value: RemoteError) -> Self {
        if value.is_unreachable() {
            Self::Offline
        } else {
            Self::Unexpected(Box::new(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SyncError;
    use crate::remote::client::RemoteError;
    use crate::repo::note_store::RepoError;
    use std::error::Error;

    #[test]
    fn unreachable_remote_maps_to_offline() {
        let err = SyncError::from(RemoteError::Unreachable("refused".to_string()));
        assert!(matches!(err, SyncError::Offline));

        let err = SyncError::from(RemoteError::Decode("eof".to_string()));
        assert_eq!(err.code(), "unexpected");
        assert!(err.source().is_some());
    }

    #[test]
    fn store_errors_are_unexpected() {
        let err = SyncError::from(RepoError::Poisoned);
        assert!(matches!(err, SyncError::Unexpected(_)));
    }

    #[test]
    fn lock_failure_exposes_its_cause() {
        let err = SyncError::LockFailed(Box::new(SyncError::RemoteRejected("bad".to_string())));
        assert_eq!(err.to_string(), "note saved but could not be locked: bad");
        assert!(err.source().is_some());
    }
}
