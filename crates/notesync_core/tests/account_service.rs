mod common;

use common::{Behavior, FakeRemote, TOKEN};
use notesync_core::{
    AccountService, Connectivity, LoginUser, NetworkMonitor, Note, NoteStore, Profile,
    RegisterUser, RemoteClient, RepoError, RepoResult, Session, SessionState, SessionStore,
    SqliteStore, SyncError,
};
use std::sync::Arc;

struct Accounts {
    service: AccountService<SqliteStore>,
    store: Arc<SqliteStore>,
    remote: Arc<FakeRemote>,
    network: Arc<NetworkMonitor>,
    session: Arc<Session>,
}

fn accounts_with(store: Arc<SqliteStore>) -> Accounts {
    let remote = FakeRemote::new();
    let network = Arc::new(NetworkMonitor::new(true));
    let session = Arc::new(Session::new());
    let service = AccountService::new(
        remote.clone() as Arc<dyn RemoteClient>,
        session.clone(),
        network.clone() as Arc<dyn Connectivity>,
        store.clone(),
    );
    Accounts {
        service,
        store,
        remote,
        network,
        session,
    }
}

fn accounts() -> Accounts {
    accounts_with(Arc::new(SqliteStore::open_in_memory().expect("in-memory store")))
}

fn ada() -> LoginUser {
    LoginUser {
        email: "ada@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn login_begins_and_persists_session() {
    let a = accounts();

    let profile = a.service.login(&ada()).await.expect("login");

    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(a.session.token().as_deref(), Some(TOKEN));
    let persisted = a.store.load_session().expect("load").expect("saved");
    assert_eq!(persisted.token, TOKEN);
    assert_eq!(a.service.current_user().expect("signed in"), profile);
}

#[tokio::test]
async fn restore_reloads_a_persisted_session() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("notesync.db");

    let first = accounts_with(Arc::new(SqliteStore::open(&path).expect("open")));
    first.service.login(&ada()).await.expect("login");
    drop(first);

    let second = accounts_with(Arc::new(SqliteStore::open(&path).expect("reopen")));
    assert!(!second.session.is_authenticated());
    assert!(second.service.restore().expect("restore"));
    assert_eq!(second.session.token().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn register_offline_fails_without_calling_remote() {
    let a = accounts();
    a.network.set_online(false);
    let user = RegisterUser {
        email: "grace@example.com".to_string(),
        name: "Grace".to_string(),
        password: "cobol".to_string(),
        image_url: String::new(),
    };

    let err = a.service.register(&user).await.expect_err("offline");

    assert!(matches!(err, SyncError::Offline));
    assert!(a.remote.calls().is_empty());
    assert!(!a.session.is_authenticated());
}

#[tokio::test]
async fn rejected_login_leaves_session_empty() {
    let a = accounts();
    a.remote.set("login", Behavior::Reject("invalid credentials"));

    let err = a.service.login(&ada()).await.expect_err("rejected");

    assert!(matches!(err, SyncError::RemoteRejected(ref m) if m == "invalid credentials"));
    assert!(!a.session.is_authenticated());
    assert!(a.store.load_session().expect("load").is_none());
}

#[tokio::test]
async fn logout_clears_session_but_keeps_notes() {
    let a = accounts();
    a.service.login(&ada()).await.expect("login");
    a.store
        .insert_or_replace(&Note::with_id("n1").title("kept"))
        .expect("seed note");

    a.service.logout().expect("logout");

    assert!(!a.session.is_authenticated());
    assert!(a.store.load_session().expect("load").is_none());
    assert!(a.store.get_by_id("n1").expect("read").is_some());
    assert!(matches!(
        a.service.current_user(),
        Err(SyncError::Unauthenticated)
    ));
}

#[tokio::test]
async fn edit_profile_updates_cached_and_persisted_profile() {
    let a = accounts();
    a.service.login(&ada()).await.expect("login");
    let fields = Profile {
        name: "Ada L.".to_string(),
        email: "ada@example.com".to_string(),
        image_url: "https://img.example.com/ada.png".to_string(),
    };

    let profile = a.service.edit_profile(&fields).await.expect("edit");

    assert_eq!(profile, fields);
    assert_eq!(a.service.current_user().expect("signed in"), fields);
    let persisted = a.store.load_session().expect("load").expect("saved");
    assert_eq!(persisted.profile, fields);
    assert_eq!(a.service.avatar_seed(), "https://img.example.com/ada.png");
}

#[tokio::test]
async fn account_calls_need_network_then_session() {
    let a = accounts();

    let err = a.service.delete_account().await.expect_err("signed out");
    assert!(matches!(err, SyncError::Unauthenticated));

    a.network.set_online(false);
    let err = a.service.delete_account().await.expect_err("offline first");
    assert!(matches!(err, SyncError::Offline));
}

#[tokio::test]
async fn delete_account_signs_out() {
    let a = accounts();
    a.service.login(&ada()).await.expect("login");

    let message = a.service.delete_account().await.expect("delete account");

    assert_eq!(message, "account deleted");
    assert!(!a.session.is_authenticated());
    assert_eq!(a.remote.calls_to("delete_account"), 1);
}

#[tokio::test]
async fn avatar_seed_falls_back_to_random_hex() {
    let a = accounts();
    a.service.login(&ada()).await.expect("login");

    let seed = a.service.avatar_seed();

    assert_eq!(seed.len(), 32);
    assert!(seed.chars().all(|c| c.is_ascii_hexdigit()));
}

/// Session store whose clear always fails.
struct StuckSessionStore(SqliteStore);

impl SessionStore for StuckSessionStore {
    fn load_session(&self) -> RepoResult<Option<SessionState>> {
        self.0.load_session()
    }

    fn save_session(&self, state: &SessionState) -> RepoResult<()> {
        self.0.save_session(state)
    }

    fn clear_session(&self) -> RepoResult<()> {
        Err(RepoError::InvalidData("disk full".to_string()))
    }
}

#[tokio::test]
async fn failed_logout_stays_signed_in_and_persisted() {
    let store = Arc::new(StuckSessionStore(
        SqliteStore::open_in_memory().expect("in-memory store"),
    ));
    let session = Arc::new(Session::new());
    let service = AccountService::new(
        FakeRemote::new() as Arc<dyn RemoteClient>,
        session.clone(),
        Arc::new(NetworkMonitor::new(true)) as Arc<dyn Connectivity>,
        store.clone(),
    );
    service.login(&ada()).await.expect("login");

    service.logout().expect_err("clear fails");

    assert!(session.is_authenticated());
    assert!(store.load_session().expect("load").is_some());
    assert_eq!(service.current_user().expect("still signed in").name, "Ada");
}
