//! Schema migrations for the note store.
//!
//! Each step is a SQL script bundled at compile time. Steps run in version
//! order, each inside its own transaction together with the
//! `user_version` bump, so a failed step leaves the previous version intact.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// `(version, script)` pairs, strictly increasing by version.
const STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_notes.sql")),
    (2, include_str!("0002_session.sql")),
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    for &(version, script) in STEPS.iter().filter(|(version, _)| *version > from) {
        run_step(conn, version, script).map_err(|source| {
            warn!(
                "event=db_migrate module=db status=error version={} error={}",
                version, source
            );
            DbError::Migration { version, source }
        })?;
    }

    if from < latest {
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={}",
            from, latest
        );
    }
    Ok(())
}

fn run_step(conn: &mut Connection, version: u32, script: &str) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(script)?;
    tx.pragma_update(None, "user_version", version)?;
    tx.commit()
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, STEPS};
    use rusqlite::Connection;

    #[test]
    fn steps_are_strictly_increasing() {
        assert!(STEPS.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert_eq!(latest_version(), STEPS.len() as u32);
    }

    #[test]
    fn partially_migrated_database_resumes() {
        let mut conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(STEPS[0].1).expect("first step");
        conn.pragma_update(None, "user_version", 1)
            .expect("bump version");

        apply_migrations(&mut conn).expect("resume");

        let session_rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM session;", [], |row| row.get(0))
            .expect("session table exists");
        assert_eq!(session_rows, 0);
    }
}
