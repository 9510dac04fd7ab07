//! Favorite record CRUD operations.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// A persisted favorite movie. Presence in the table means "favorite".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRecord {
    /// IMDb ID (primary key).
    pub imdb_id: String,
    /// Title.
    pub title: String,
    /// Release year as reported by OMDb.
    pub year: String,
    /// Poster URL.
    pub poster: String,
    /// OMDb `Type`.
    pub kind: String,
}

/// Inserts a favorite, replacing any record with the same `imdb_id`.
///
/// A replaced record is deleted and re-inserted, so it moves to the end of
/// [`load_favorites`].
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn upsert_favorite(conn: &Connection, record: &FavoriteRecord) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO favorites (imdb_id, title, year, poster, kind)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            record.imdb_id,
            record.title,
            record.year,
            record.poster,
            record.kind,
        ],
    )
    .with_context(|| format!("failed to upsert favorite {}", record.imdb_id))?;
    Ok(())
}

/// Deletes the favorite with `imdb_id`. Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_favorite(conn: &Connection, imdb_id: &str) -> Result<bool> {
    let rows = conn
        .execute("DELETE FROM favorites WHERE imdb_id = ?1", [imdb_id])
        .with_context(|| format!("failed to delete favorite {imdb_id}"))?;
    Ok(rows > 0)
}

/// Returns whether a favorite with `imdb_id` exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn favorite_exists(conn: &Connection, imdb_id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM favorites WHERE imdb_id = ?1)",
        [imdb_id],
        |row| row.get(0),
    )
    .with_context(|| format!("failed to look up favorite {imdb_id}"))
}

/// Loads all favorites in insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_favorites(conn: &Connection) -> Result<Vec<FavoriteRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT imdb_id, title, year, poster, kind
             FROM favorites
             ORDER BY rowid",
        )
        .context("failed to prepare favorites query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(FavoriteRecord {
                imdb_id: row.get(0)?,
                title: row.get(1)?,
                year: row.get(2)?,
                poster: row.get(3)?,
                kind: row.get(4)?,
            })
        })
        .context("failed to query favorites")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read favorites rows")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::connection::open_in_memory;

    fn record(imdb_id: &str, title: &str) -> FavoriteRecord {
        FavoriteRecord {
            imdb_id: String::from(imdb_id),
            title: String::from(title),
            year: String::from("2005"),
            poster: String::from("N/A"),
            kind: String::from("movie"),
        }
    }

    #[test]
    fn test_upsert_then_load() {
        // Arrange
        let conn = open_in_memory().unwrap();

        // Act
        upsert_favorite(&conn, &record("tt1", "One")).unwrap();
        upsert_favorite(&conn, &record("tt2", "Two")).unwrap();
        let loaded = load_favorites(&conn).unwrap();

        // Assert
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], record("tt1", "One"));
        assert_eq!(loaded[1].imdb_id, "tt2");
    }

    #[test]
    fn test_upsert_replaces_same_id() {
        // Arrange
        let conn = open_in_memory().unwrap();
        upsert_favorite(&conn, &record("tt1", "Old title")).unwrap();

        // Act
        upsert_favorite(&conn, &record("tt1", "New title")).unwrap();
        let loaded = load_favorites(&conn).unwrap();

        // Assert
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "New title");
    }

    #[test]
    fn test_replaced_favorite_moves_to_end() {
        // Arrange
        let conn = open_in_memory().unwrap();
        upsert_favorite(&conn, &record("tt1", "One")).unwrap();
        upsert_favorite(&conn, &record("tt2", "Two")).unwrap();

        // Act
        upsert_favorite(&conn, &record("tt1", "One again")).unwrap();
        let loaded = load_favorites(&conn).unwrap();

        // Assert
        let ids: Vec<&str> = loaded.iter().map(|r| r.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt2", "tt1"]);
        assert_eq!(loaded[1].title, "One again");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        // Arrange
        let conn = open_in_memory().unwrap();
        upsert_favorite(&conn, &record("tt1", "One")).unwrap();

        // Act
        let removed = delete_favorite(&conn, "tt404").unwrap();

        // Assert
        assert!(!removed);
        assert_eq!(load_favorites(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_exists_tracks_insert_and_delete() {
        // Arrange
        let conn = open_in_memory().unwrap();

        // Act & Assert
        assert!(!favorite_exists(&conn, "tt1").unwrap());
        upsert_favorite(&conn, &record("tt1", "One")).unwrap();
        assert!(favorite_exists(&conn, "tt1").unwrap());
        assert!(delete_favorite(&conn, "tt1").unwrap());
        assert!(!favorite_exists(&conn, "tt1").unwrap());
    }
}
