#![allow(dead_code)]

use async_trait::async_trait;
use notesync_core::model::user::{AuthPayload, LoginUser, Profile, RegisterUser, UpdateProfile};
use notesync_core::remote::types::{Ack, ApiResponse, RemoteNote, SafePassword};
use notesync_core::{
    Connectivity, NetworkMonitor, RemoteClient, RemoteError, RemoteResult, Session, SessionState,
    SqliteStore, SyncEngine,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "token-ada";

/// How the fake service answers one endpoint.
#[derive(Debug, Clone)]
pub enum Behavior {
    Accept,
    Reject(&'static str),
    Unreachable,
}

/// In-memory stand-in for the note service.
///
/// Records every call as `endpoint:argument` and keeps a server-side copy of
/// accepted notes.
#[derive(Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<String>>,
    behaviors: Mutex<HashMap<&'static str, Behavior>>,
    notes: Mutex<BTreeMap<String, RemoteNote>>,
    passwords: Mutex<HashMap<String, String>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, endpoint: &'static str, behavior: Behavior) {
        self.behaviors
            .lock()
            .expect("behaviors lock")
            .insert(endpoint, behavior);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        let prefix = format!("{endpoint}:");
        self.calls()
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("calls lock").clear();
    }

    /// Puts a note on the server without going through the engine.
    pub fn seed(&self, note: RemoteNote, password: Option<&str>) {
        if let Some(password) = password {
            self.passwords
                .lock()
                .expect("passwords lock")
                .insert(note.note_id.clone(), password.to_string());
        }
        self.notes
            .lock()
            .expect("notes lock")
            .insert(note.note_id.clone(), note);
    }

    pub fn server_note(&self, id: &str) -> Option<RemoteNote> {
        self.notes.lock().expect("notes lock").get(id).cloned()
    }

    pub fn server_password(&self, id: &str) -> Option<String> {
        self.passwords.lock().expect("passwords lock").get(id).cloned()
    }

    fn gate<T>(&self, endpoint: &'static str, argument: &str) -> Option<RemoteResult<ApiResponse<T>>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(format!("{endpoint}:{argument}"));
        let behavior = self
            .behaviors
            .lock()
            .expect("behaviors lock")
            .get(endpoint)
            .cloned()
            .unwrap_or(Behavior::Accept);
        match behavior {
            Behavior::Accept => None,
            Behavior::Reject(message) => Some(Ok(ApiResponse::rejected(message))),
            Behavior::Unreachable => Some(Err(RemoteError::Unreachable(
                "connection refused".to_string(),
            ))),
        }
    }

    fn store_note(&self, note: &RemoteNote) {
        let mut stored = note.clone();
        if let Some(password) = stored.safe_password.take() {
            self.passwords
                .lock()
                .expect("passwords lock")
                .insert(stored.note_id.clone(), password);
        }
        self.notes
            .lock()
            .expect("notes lock")
            .insert(stored.note_id.clone(), stored);
    }
}

fn auth(email: &str, name: &str, image_url: &str) -> ApiResponse<AuthPayload> {
    ApiResponse::ok(
        "welcome",
        Some(AuthPayload {
            token: TOKEN.to_string(),
            user: Profile {
                name: name.to_string(),
                email: email.to_string(),
                image_url: image_url.to_string(),
            },
        }),
    )
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn create_account(&self, user: &RegisterUser) -> RemoteResult<ApiResponse<AuthPayload>> {
        if let Some(result) = self.gate("register_user", &user.email) {
            return result;
        }
        Ok(auth(&user.email, &user.name, &user.image_url))
    }

    async fn login(&self, credentials: &LoginUser) -> RemoteResult<ApiResponse<AuthPayload>> {
        if let Some(result) = self.gate("login", &credentials.email) {
            return result;
        }
        Ok(auth(&credentials.email, "Ada", ""))
    }

    async fn edit_profile(
        &self,
        _token: &str,
        fields: &UpdateProfile,
    ) -> RemoteResult<ApiResponse<Profile>> {
        if let Some(result) = self.gate("edit_profile", &fields.email) {
            return result;
        }
        Ok(ApiResponse::ok("profile updated", Some(fields.clone())))
    }

    async fn delete_account(&self, _token: &str) -> RemoteResult<Ack> {
        if let Some(result) = self.gate("delete_account", "") {
            return result;
        }
        Ok(ApiResponse::ok("account deleted", None))
    }

    async fn create_note(&self, _token: &str, note: &RemoteNote) -> RemoteResult<Ack> {
        if let Some(result) = self.gate("create_note", &note.note_id) {
            return result;
        }
        self.store_note(note);
        Ok(ApiResponse::ok("created", None))
    }

    async fn update_note(&self, _token: &str, note: &RemoteNote) -> RemoteResult<Ack> {
        if let Some(result) = self.gate("update_note", &note.note_id) {
            return result;
        }
        self.store_note(note);
        Ok(ApiResponse::ok("updated", None))
    }

    async fn delete_note(&self, _token: &str, id: &str) -> RemoteResult<Ack> {
        if let Some(result) = self.gate("delete_note", id) {
            return result;
        }
        self.notes.lock().expect("notes lock").remove(id);
        Ok(ApiResponse::ok("deleted", None))
    }

    async fn list_notes(&self, _token: &str) -> RemoteResult<ApiResponse<Vec<RemoteNote>>> {
        if let Some(result) = self.gate("load_notes", "") {
            return result;
        }
        let notes = self.notes.lock().expect("notes lock").values().cloned().collect();
        Ok(ApiResponse::ok("loaded", Some(notes)))
    }

    async fn set_lock(
        &self,
        _token: &str,
        id: &str,
        safe_password: &SafePassword,
    ) -> RemoteResult<Ack> {
        if let Some(result) = self.gate("set_lock", id) {
            return result;
        }
        let mut notes = self.notes.lock().expect("notes lock");
        let Some(note) = notes.get_mut(id) else {
            return Ok(ApiResponse::rejected("note not found"));
        };
        note.locked = true;
        if let Some(password) = &safe_password.safe_password {
            self.passwords
                .lock()
                .expect("passwords lock")
                .insert(id.to_string(), password.clone());
        }
        Ok(ApiResponse::ok("locked", None))
    }

    async fn get_locked_note(
        &self,
        _token: &str,
        id: &str,
        safe_password: &SafePassword,
    ) -> RemoteResult<ApiResponse<RemoteNote>> {
        if let Some(result) = self.gate("get_locked_note", id) {
            return result;
        }
        let expected = self.server_password(id);
        if expected.is_none() || expected != safe_password.safe_password {
            return Ok(ApiResponse::rejected("wrong password"));
        }
        Ok(ApiResponse::ok("unlocked", self.server_note(id)))
    }
}

pub fn profile() -> Profile {
    Profile {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        image_url: String::new(),
    }
}

pub fn signed_in_state() -> SessionState {
    SessionState {
        token: TOKEN.to_string(),
        profile: profile(),
    }
}

/// Engine wired to a fresh in-memory store and a fake remote.
pub struct Harness {
    pub engine: SyncEngine<SqliteStore>,
    pub store: Arc<SqliteStore>,
    pub remote: Arc<FakeRemote>,
    pub network: Arc<NetworkMonitor>,
    pub session: Arc<Session>,
}

impl Harness {
    pub fn signed_in() -> Self {
        Self::build(Session::signed_in(signed_in_state()))
    }

    pub fn signed_out() -> Self {
        Self::build(Session::new())
    }

    fn build(session: Session) -> Self {
        let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store"));
        let remote = FakeRemote::new();
        let network = Arc::new(NetworkMonitor::new(true));
        let session = Arc::new(session);
        let engine = SyncEngine::new(
            store.clone(),
            remote.clone() as Arc<dyn RemoteClient>,
            session.clone(),
            network.clone() as Arc<dyn Connectivity>,
        );
        Self {
            engine,
            store,
            remote,
            network,
            session,
        }
    }
}
