//! Account and profile models.
//!
//! Field names follow the remote service's camelCase JSON schema.

use serde::{Deserialize, Serialize};

/// Sign-up request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub image_url: String,
}

/// Sign-in credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Cached profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: String,
}

/// Profile edit request. Every field is replaced.
pub type UpdateProfile = Profile;

/// Payload returned by register/login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Opaque bearer token.
    pub token: String,
    pub user: Profile,
}
