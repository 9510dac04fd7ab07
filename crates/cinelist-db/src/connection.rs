//! Database connection management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations::run_migrations;

/// Database file name.
const DB_FILE_NAME: &str = "cinelist.db";

/// Opens (or creates) the database and brings its schema up to date.
///
/// - If `dir` is `Some`, uses `{dir}/cinelist.db`.
/// - Otherwise uses `~/.local/share/cinelist/cinelist.db`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the schema setup fails.
pub fn open_db(dir: Option<&Path>) -> Result<Connection> {
    let db_path = resolve_db_path(dir)?;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "opened favorites database");

    run_migrations(&conn).context("database schema setup failed")?;

    Ok(conn)
}

/// Opens a private in-memory database with the current schema.
///
/// # Errors
///
/// Returns an error if `SQLite` cannot allocate the database or the schema setup fails.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    run_migrations(&conn).context("database schema setup failed")?;
    Ok(conn)
}

/// Resolves the database file path.
fn resolve_db_path(dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(DB_FILE_NAME));
    }

    let home = std::env::var("HOME").context("HOME environment variable is not set")?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("cinelist")
        .join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_open_db_creates_nested_dir() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        // Act
        let conn = open_db(Some(&nested)).unwrap();

        // Assert
        assert!(nested.join(DB_FILE_NAME).exists());
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert!(version > 0);
    }

    #[test]
    fn test_resolve_db_path_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/cinelist-test");

        // Act
        let path = resolve_db_path(Some(&dir)).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/cinelist-test/cinelist.db"));
    }

    #[test]
    fn test_resolve_db_path_default() {
        // Arrange & Act
        let path = resolve_db_path(None).unwrap();

        // Assert
        assert!(path.ends_with(".local/share/cinelist/cinelist.db"));
    }
}
