//! Command-line front end for the note sync core.
//!
//! # Responsibility
//! - Wire config, the SQLite store and the HTTP client into the engine.
//! - Map each subcommand onto one engine or account operation.
//! - Print results; exit non-zero on the first error.

use clap::{Parser, Subcommand};
use log::info;
use notesync_core::{
    effective_log_level, group_by_label, init_logging, search_notes, AccountService, ClientConfig,
    Confirmation, Connectivity, HttpRemoteClient, LoginUser, NetworkMonitor, Note, RemoteClient,
    Session, SqliteStore, SyncEngine, SyncReport,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "notesync", version, about = "Offline-first notes with remote sync")]
struct Cli {
    /// JSON client config.
    #[arg(long, env = "NOTESYNC_CONFIG", default_value = "notesync.json")]
    config: PathBuf,
    /// Local SQLite database.
    #[arg(long, env = "NOTESYNC_DB", default_value = "notesync.db")]
    db: PathBuf,
    /// Write rolling logs into this directory.
    #[arg(long, env = "NOTESYNC_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// Treat the network as unreachable.
    #[arg(long)]
    offline: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List active notes, grouped by label.
    List,
    /// Find unlocked notes containing the query.
    Search { query: String },
    /// Save a new note.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        label: Option<String>,
        /// Checklist item; repeat for more.
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// Delete a note by id.
    Delete { id: String },
    /// Push pending deletes, creates and updates.
    Sync,
    /// Replace local notes with the remote copies.
    Pull,
    /// Sign in and remember the session.
    Login {
        email: String,
        #[arg(long, env = "NOTESYNC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session. Notes stay on this device.
    Logout,
    /// Show the signed-in user.
    Whoami,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = ClientConfig::load(&cli.config)?;
    if let Some(log_dir) = &cli.log_dir {
        init_logging(
            &effective_log_level(&config.log_level),
            absolute(log_dir)?,
        )?;
    }

    let store = Arc::new(SqliteStore::open(&cli.db)?);
    let remote: Arc<dyn RemoteClient> = Arc::new(HttpRemoteClient::new(&config)?);
    let network = Arc::new(NetworkMonitor::new(!cli.offline));
    let connectivity: Arc<dyn Connectivity> = network;
    let session = Arc::new(Session::new());

    let accounts = AccountService::new(
        remote.clone(),
        session.clone(),
        connectivity.clone(),
        store.clone(),
    );
    accounts.restore()?;
    let engine = SyncEngine::new(store, remote, session, connectivity);

    info!("event=cli_command module=cli command={}", command_name(&cli.command));
    match cli.command {
        Command::List => {
            let notes = engine.list_active()?;
            for (label, group) in group_by_label(&notes) {
                println!("[{}]", if label.is_empty() { "-" } else { label.as_str() });
                for note in group {
                    print_note(note);
                }
            }
        }
        Command::Search { query } => {
            let notes = engine.list_active()?;
            for note in search_notes(&notes, &query) {
                print_note(note);
            }
        }
        Command::Add {
            title,
            body,
            label,
            items,
        } => {
            let mut note = Note::new().title(title);
            if let Some(body) = body {
                note = note.description(body);
            }
            if let Some(label) = label {
                note = note.label(label);
            }
            for item in items {
                note = note.checkpoint(item, false);
            }
            note.validate()?;
            let id = note.id.clone();
            let outcome = engine.create_note(note, None).await?;
            println!("{id} {}", describe(outcome));
        }
        Command::Delete { id } => {
            let outcome = engine.delete_note(&id).await?;
            println!("{id} {}", describe(outcome));
        }
        Command::Sync => print_report(&engine.sync_all().await),
        Command::Pull => print_report(&engine.pull_remote().await),
        Command::Login { email, password } => {
            let profile = accounts.login(&LoginUser { email, password }).await?;
            println!("signed in as {} <{}>", profile.name, profile.email);
        }
        Command::Logout => {
            accounts.logout()?;
            println!("signed out");
        }
        Command::Whoami => {
            let profile = accounts.current_user()?;
            println!("{} <{}>", profile.name, profile.email);
        }
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::List => "list",
        Command::Search { .. } => "search",
        Command::Add { .. } => "add",
        Command::Delete { .. } => "delete",
        Command::Sync => "sync",
        Command::Pull => "pull",
        Command::Login { .. } => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
    }
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn describe(outcome: Confirmation) -> &'static str {
    match outcome {
        Confirmation::LocalOnly => "saved locally",
        Confirmation::Synced => "synced",
        Confirmation::Unchanged => "unchanged",
    }
}

fn print_note(note: &Note) {
    let marker = match (note.locked, note.connected) {
        (true, _) => "locked",
        (false, true) => "synced",
        (false, false) => "local",
    };
    println!(
        "  {} [{}] {}",
        note.id,
        marker,
        note.title.as_deref().unwrap_or("(untitled)")
    );
    for checkpoint in &note.checkpoints {
        println!(
            "      [{}] {}",
            if checkpoint.checked { "x" } else { " " },
            checkpoint.content
        );
    }
}

fn print_report(report: &SyncReport) {
    if report.skipped {
        println!("skipped: not signed in or offline");
        return;
    }
    println!(
        "deleted={} created={} updated={} pulled={} failed={}",
        report.deleted, report.created, report.updated, report.pulled, report.failed
    );
}
