//! Account use-case service.
//!
//! # Responsibility
//! - Sign users up, in and out, and keep the shared `Session` current.
//! - Persist the session so a restart stays signed in.
//!
//! # Invariants
//! - The in-memory session and the persisted session change together.
//! - Signing out never touches local notes.
//! - Account calls check connectivity before the session, matching the
//!   order users see errors in.

use crate::connectivity::Connectivity;
use crate::model::user::{AuthPayload, LoginUser, Profile, RegisterUser, UpdateProfile};
use crate::remote::client::RemoteClient;
use crate::remote::types::ApiResponse;
use crate::repo::session_store::SessionStore;
use crate::session::{Session, SessionState};
use crate::sync::error::{SyncError, SyncResult};
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Account facade over the remote client and session store.
pub struct AccountService<S: SessionStore> {
    remote: Arc<dyn RemoteClient>,
    session: Arc<Session>,
    connectivity: Arc<dyn Connectivity>,
    store: Arc<S>,
}

impl<S: SessionStore> AccountService<S> {
    pub fn new(
        remote: Arc<dyn RemoteClient>,
        session: Arc<Session>,
        connectivity: Arc<dyn Connectivity>,
        store: Arc<S>,
    ) -> Self {
        Self {
            remote,
            session,
            connectivity,
            store,
        }
    }

    /// Loads a persisted session into memory.
    ///
    /// Returns whether a session was found.
    pub fn restore(&self) -> SyncResult<bool> {
        match self.store.load_session()? {
            Some(state) => {
                self.session.begin(state);
                info!("event=session_restore module=account status=ok");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Creates an account and signs it in.
    pub async fn register(&self, user: &RegisterUser) -> SyncResult<Profile> {
        self.require_online()?;
        let response = self.remote.create_account(user).await?;
        self.start_session("register", response)
    }

    /// Signs in with email and password.
    pub async fn login(&self, credentials: &LoginUser) -> SyncResult<Profile> {
        self.require_online()?;
        let response = self.remote.login(credentials).await?;
        self.start_session("login", response)
    }

    /// Signs out locally. Notes stay on the device.
    pub fn logout(&self) -> SyncResult<()> {
        self.store.clear_session()?;
        self.session.end();
        info!("event=logout module=account status=ok");
        Ok(())
    }

    /// Deletes the remote account, then signs out.
    ///
    /// Returns the service's confirmation message.
    pub async fn delete_account(&self) -> SyncResult<String> {
        self.require_online()?;
        let token = self.require_token()?;
        let response = self.remote.delete_account(&token).await?;
        if !response.success {
            return Err(SyncError::RemoteRejected(response.message));
        }
        self.logout()?;
        info!("event=delete_account module=account status=ok");
        Ok(response.message)
    }

    /// Replaces name, email and image URL of the signed-in user.
    pub async fn edit_profile(&self, fields: &UpdateProfile) -> SyncResult<Profile> {
        self.require_online()?;
        let token = self.require_token()?;
        let response = self.remote.edit_profile(&token, fields).await?;
        if !response.success {
            return Err(SyncError::RemoteRejected(response.message));
        }

        let profile = response.data.unwrap_or_else(|| fields.clone());
        if self.session.update_profile(profile.clone()) {
            if let Some(state) = self.session.snapshot() {
                self.store.save_session(&state)?;
            }
        }
        info!("event=edit_profile module=account status=ok");
        Ok(profile)
    }

    /// Cached profile of the signed-in user.
    pub fn current_user(&self) -> SyncResult<Profile> {
        self.session.profile().ok_or(SyncError::Unauthenticated)
    }

    /// Image URL of the signed-in user, or a random seed for a generated
    /// placeholder avatar.
    pub fn avatar_seed(&self) -> String {
        self.session
            .profile()
            .map(|profile| profile.image_url)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
    }

    fn start_session(
        &self,
        action: &'static str,
        response: ApiResponse<AuthPayload>,
    ) -> SyncResult<Profile> {
        if !response.success {
            warn!(
                "event={} module=account status=error error_code=remote_rejected",
                action
            );
            return Err(SyncError::RemoteRejected(response.message));
        }
        let payload = response
            .data
            .ok_or_else(|| SyncError::Unexpected("auth response carried no session".into()))?;

        let state = SessionState {
            token: payload.token,
            profile: payload.user,
        };
        self.store.save_session(&state)?;
        let profile = state.profile.clone();
        self.session.begin(state);
        info!("event={} module=account status=ok", action);
        Ok(profile)
    }

    fn require_online(&self) -> SyncResult<()> {
        if self.connectivity.is_online() {
            Ok(())
        } else {
            Err(SyncError::Offline)
        }
    }

    fn require_token(&self) -> SyncResult<String> {
        self.session.token().ok_or(SyncError::Unauthenticated)
    }
}
