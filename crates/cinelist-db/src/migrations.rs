//! Schema version management using `PRAGMA user_version`.
//!
//! There are no incremental migrations: the favorites table is the only
//! persisted state, and a schema change drops and recreates it.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 1;

/// Ensures the schema matches `CURRENT_VERSION`.
///
/// A fresh database is created; any other version is destroyed and rebuilt.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version == CURRENT_VERSION {
        return Ok(());
    }

    if version != 0 {
        tracing::warn!(
            found = version,
            expected = CURRENT_VERSION,
            "favorites schema version mismatch, recreating table"
        );
        conn.execute_batch("DROP TABLE IF EXISTS favorites;")
            .context("failed to drop outdated favorites table")?;
    }

    create_schema(conn).context("failed to create schema")?;

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Creates the `favorites` table.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS favorites (
            imdb_id  TEXT PRIMARY KEY NOT NULL,
            title    TEXT NOT NULL,
            year     TEXT NOT NULL DEFAULT '',
            poster   TEXT NOT NULL DEFAULT '',
            kind     TEXT NOT NULL DEFAULT ''
        );",
    )
    .context("failed to create favorites table")?;

    Ok(())
}
