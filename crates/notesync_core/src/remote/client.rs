//! Remote client contract.
//!
//! # Responsibility
//! - Describe the REST note/account service as a stateless async seam.
//! - Separate transport failures (`RemoteError`) from service rejections
//!   (`ApiResponse::success == false`).
//!
//! # Invariants
//! - Implementations never retry; retries belong to the sync engine.
//! - `create_note` must behave as an upsert for an existing `noteId`.

use crate::model::user::{AuthPayload, LoginUser, Profile, RegisterUser, UpdateProfile};
use crate::remote::types::{Ack, ApiResponse, RemoteNote, SafePassword};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Transport-level failure talking to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Host unreachable, connection refused or timed out.
    Unreachable(String),
    /// Non-success HTTP status without a decodable envelope.
    Status { status: u16, body: String },
    /// Success status with an undecodable body.
    Decode(String),
    /// Any other client-side failure.
    Transport(String),
}

impl RemoteError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(details) => write!(f, "remote service unreachable: {details}"),
            Self::Status { status, body } => write!(f, "remote returned HTTP {status}: {body}"),
            Self::Decode(details) => write!(f, "undecodable remote response: {details}"),
            Self::Transport(details) => write!(f, "remote transport error: {details}"),
        }
    }
}

impl Error for RemoteError {}

/// REST note/account service.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn create_account(&self, user: &RegisterUser) -> RemoteResult<ApiResponse<AuthPayload>>;
    async fn login(&self, credentials: &LoginUser) -> RemoteResult<ApiResponse<AuthPayload>>;
    async fn edit_profile(
        &self,
        token: &str,
        fields: &UpdateProfile,
    ) -> RemoteResult<ApiResponse<Profile>>;
    async fn delete_account(&self, token: &str) -> RemoteResult<Ack>;

    async fn create_note(&self, token: &str, note: &RemoteNote) -> RemoteResult<Ack>;
    async fn update_note(&self, token: &str, note: &RemoteNote) -> RemoteResult<Ack>;
    async fn delete_note(&self, token: &str, id: &str) -> RemoteResult<Ack>;
    async fn list_notes(&self, token: &str) -> RemoteResult<ApiResponse<Vec<RemoteNote>>>;
    async fn set_lock(
        &self,
        token: &str,
        id: &str,
        safe_password: &SafePassword,
    ) -> RemoteResult<Ack>;
    async fn get_locked_note(
        &self,
        token: &str,
        id: &str,
        safe_password: &SafePassword,
    ) -> RemoteResult<ApiResponse<RemoteNote>>;
}
