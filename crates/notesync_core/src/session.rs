//! Signed-in session state.
//!
//! # Responsibility
//! - Hold the bearer token and cached profile for the current user.
//! - Decide whether sync runs in online-capable or local-only mode.
//!
//! # Invariants
//! - No token means no remote note call is attempted.
//! - `begin` replaces the whole state; `end` clears it.

use crate::model::user::Profile;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Token plus cached profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub token: String,
    pub profile: Profile,
}

/// Shared session handle. Wrap in `Arc` to share between services.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Option<SessionState>>,
}

impl Session {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that is already signed in.
    pub fn signed_in(state: SessionState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
        }
    }

    /// Starts (or replaces) the signed-in state.
    pub fn begin(&self, state: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
    }

    /// Signs out.
    pub fn end(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.read(|state| state.token.clone())
    }

    pub fn profile(&self) -> Option<Profile> {
        self.read(|state| state.profile.clone())
    }

    /// Replaces the cached profile while keeping the token.
    ///
    /// Returns `false` when signed out.
    pub fn update_profile(&self, profile: Profile) -> bool {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(state) => {
                state.profile = profile;
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Option<SessionState> {
        self.read(Clone::clone)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|_| ()).is_some()
    }

    fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> Option<T> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}
