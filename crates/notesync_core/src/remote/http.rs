//! `reqwest`-backed remote client.
//!
//! # Invariants
//! - Every authenticated call sends `Authorization: Bearer <token>`.
//! - Connect failures and timeouts surface as `RemoteError::Unreachable`.
//! - Response bodies are decoded as envelopes even on non-2xx statuses, so
//!   service rejections keep their message.

use crate::config::ClientConfig;
use crate::model::user::{AuthPayload, LoginUser, Profile, RegisterUser, UpdateProfile};
use crate::remote::client::{RemoteClient, RemoteError, RemoteResult};
use crate::remote::types::{Ack, ApiResponse, RemoteNote, SafePassword};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// HTTP binding of [`RemoteClient`].
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    http: Client,
    api_root: Url,
}

impl HttpRemoteClient {
    pub fn new(config: &ClientConfig) -> RemoteResult<Self> {
        let api_root = Url::parse(&config.api_root())
            .map_err(|err| RemoteError::Transport(format!("invalid base url: {err}")))?;
        if api_root.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!(
                "base url `{api_root}` cannot carry endpoint paths"
            )));
        }
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(Self { http, api_root })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(segments));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> RemoteResult<ApiResponse<T>> {
        let started_at = Instant::now();
        let result = execute(request).await;
        match &result {
            Ok(envelope) => debug!(
                "event=remote_call module=remote endpoint={} status=ok success={} duration_ms={}",
                endpoint,
                envelope.success,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=remote_call module=remote endpoint={} status=error duration_ms={} error={}",
                endpoint,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> RemoteResult<ApiResponse<T>> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;

    match serde_json::from_slice::<ApiResponse<T>>(&body) {
        Ok(envelope) => Ok(envelope),
        Err(err) if status.is_success() => Err(RemoteError::Decode(err.to_string())),
        Err(_) => Err(RemoteError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect(),
        }),
    }
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_connect() || err.is_timeout() {
        RemoteError::Unreachable(err.to_string())
    } else if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn create_account(&self, user: &RegisterUser) -> RemoteResult<ApiResponse<AuthPayload>> {
        let request = self
            .request(Method::POST, &["users", "register_user"], None)
            .json(user);
        self.send("register_user", request).await
    }

    async fn login(&self, credentials: &LoginUser) -> RemoteResult<ApiResponse<AuthPayload>> {
        let request = self
            .request(Method::POST, &["users", "login"], None)
            .json(credentials);
        self.send("login", request).await
    }

    async fn edit_profile(
        &self,
        token: &str,
        fields: &UpdateProfile,
    ) -> RemoteResult<ApiResponse<Profile>> {
        let request = self
            .request(Method::PUT, &["users", "edit_profile"], Some(token))
            .json(fields);
        self.send("edit_profile", request).await
    }

    async fn delete_account(&self, token: &str) -> RemoteResult<Ack> {
        let request = self.request(Method::DELETE, &["users", "delete_account"], Some(token));
        self.send("delete_account", request).await
    }

    async fn create_note(&self, token: &str, note: &RemoteNote) -> RemoteResult<Ack> {
        let request = self
            .request(Method::POST, &["notes", "create_note"], Some(token))
            .json(note);
        self.send("create_note", request).await
    }

    async fn update_note(&self, token: &str, note: &RemoteNote) -> RemoteResult<Ack> {
        let request = self
            .request(Method::PUT, &["notes", "update_note"], Some(token))
            .json(note);
        self.send("update_note", request).await
    }

    async fn delete_note(&self, token: &str, id: &str) -> RemoteResult<Ack> {
        let request = self.request(Method::DELETE, &["notes", "delete_note", id], Some(token));
        self.send("delete_note", request).await
    }

    async fn list_notes(&self, token: &str) -> RemoteResult<ApiResponse<Vec<RemoteNote>>> {
        let request = self.request(Method::GET, &["notes", "load_notes"], Some(token));
        self.send("load_notes", request).await
    }

    async fn set_lock(
        &self,
        token: &str,
        id: &str,
        safe_password: &SafePassword,
    ) -> RemoteResult<Ack> {
        let request = self
            .request(Method::PUT, &["notes", "set_lock", id], Some(token))
            .json(safe_password);
        self.send("set_lock", request).await
    }

    async fn get_locked_note(
        &self,
        token: &str,
        id: &str,
        safe_password: &SafePassword,
    ) -> RemoteResult<ApiResponse<RemoteNote>> {
        let request = self
            .request(Method::POST, &["notes", id], Some(token))
            .json(safe_password);
        self.send("get_locked_note", request).await
    }
}
