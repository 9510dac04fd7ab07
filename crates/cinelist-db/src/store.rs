//! `FavoriteStore` - observable favorites table.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tokio::sync::watch;

use super::connection::{open_db, open_in_memory};
use super::favorites::{
    FavoriteRecord, delete_favorite, favorite_exists, load_favorites, upsert_favorite,
};

/// Record store keyed by IMDb ID with a push-based live query.
///
/// Every successful mutation publishes the full table to all receivers
/// obtained from [`FavoriteStore::observe_all`] before it returns.
/// Observers unsubscribe by dropping their receiver.
#[allow(clippy::module_name_repetitions)]
pub trait FavoriteStore: Send + Sync {
    /// Inserts or replaces the record with the same `imdb_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert(&self, record: &FavoriteRecord) -> Result<()>;

    /// Removes the record with `imdb_id`; absent IDs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_by_id(&self, imdb_id: &str) -> Result<()>;

    /// Point lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn exists_by_id(&self, imdb_id: &str) -> Result<bool>;

    /// Current contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn load_all(&self) -> Result<Vec<FavoriteRecord>>;

    /// Subscribes to the live contents. The receiver starts at the latest snapshot.
    fn observe_all(&self) -> watch::Receiver<Vec<FavoriteRecord>>;
}

/// `SQLite`-backed [`FavoriteStore`].
#[allow(clippy::module_name_repetitions)]
pub struct SqliteFavoriteStore {
    /// Serialized connection; reads and writes may come from any thread.
    conn: Mutex<Connection>,
    /// Latest snapshot, pushed on every mutation.
    snapshot: watch::Sender<Vec<FavoriteRecord>>,
}

impl std::fmt::Debug for SqliteFavoriteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteFavoriteStore")
            .field("favorites", &self.snapshot.borrow().len())
            .field("observers", &self.snapshot.receiver_count())
            .finish_non_exhaustive()
    }
}

impl SqliteFavoriteStore {
    /// Wraps an already-migrated connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot cannot be loaded.
    pub fn new(conn: Connection) -> Result<Self> {
        let initial = load_favorites(&conn)?;
        let (snapshot, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            snapshot,
        })
    }

    /// Opens the on-disk store (see [`open_db`] for the path rules).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or read.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        Self::new(open_db(dir)?)
    }

    /// Opens a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot create the database.
    pub fn in_memory() -> Result<Self> {
        Self::new(open_in_memory()?)
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.snapshot.receiver_count()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("favorites connection lock poisoned"))
    }

    /// Reloads the table and pushes it to observers. Runs under the
    /// connection lock so snapshots are published in write order.
    fn publish(&self, conn: &Connection) -> Result<()> {
        let all = load_favorites(conn)?;
        tracing::debug!(
            favorites = all.len(),
            observers = self.snapshot.receiver_count(),
            "publishing favorites snapshot"
        );
        self.snapshot.send_replace(all);
        Ok(())
    }
}

impl FavoriteStore for SqliteFavoriteStore {
    fn upsert(&self, record: &FavoriteRecord) -> Result<()> {
        let conn = self.lock()?;
        upsert_favorite(&conn, record)?;
        self.publish(&conn)
    }

    fn delete_by_id(&self, imdb_id: &str) -> Result<()> {
        let conn = self.lock()?;
        if delete_favorite(&conn, imdb_id)? {
            self.publish(&conn)?;
        }
        Ok(())
    }

    fn exists_by_id(&self, imdb_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        favorite_exists(&conn, imdb_id)
    }

    fn load_all(&self) -> Result<Vec<FavoriteRecord>> {
        let conn = self.lock()?;
        load_favorites(&conn)
    }

    fn observe_all(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.snapshot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Arc;

    use super::*;

    fn record(imdb_id: &str) -> FavoriteRecord {
        FavoriteRecord {
            imdb_id: String::from(imdb_id),
            title: format!("Title {imdb_id}"),
            year: String::from("1999"),
            poster: String::from("N/A"),
            kind: String::from("movie"),
        }
    }

    #[test]
    fn test_observer_sees_upsert_without_refresh() {
        // Arrange
        let store = SqliteFavoriteStore::in_memory().unwrap();
        let mut rx = store.observe_all();
        assert!(rx.borrow_and_update().is_empty());

        // Act
        store.upsert(&record("tt1")).unwrap();

        // Assert: visible as soon as upsert returns
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].imdb_id, "tt1");
    }

    #[test]
    fn test_observer_sees_delete() {
        // Arrange
        let store = SqliteFavoriteStore::in_memory().unwrap();
        store.upsert(&record("tt1")).unwrap();
        store.upsert(&record("tt2")).unwrap();
        let mut rx = store.observe_all();
        rx.borrow_and_update();

        // Act
        store.delete_by_id("tt1").unwrap();

        // Assert
        assert!(rx.has_changed().unwrap());
        let ids: Vec<String> = rx
            .borrow_and_update()
            .iter()
            .map(|r| r.imdb_id.clone())
            .collect();
        assert_eq!(ids, vec![String::from("tt2")]);
    }

    #[test]
    fn test_delete_missing_does_not_notify() {
        // Arrange
        let store = SqliteFavoriteStore::in_memory().unwrap();
        let mut rx = store.observe_all();
        rx.borrow_and_update();

        // Act
        store.delete_by_id("tt404").unwrap();

        // Assert
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_dropping_receiver_unsubscribes() {
        // Arrange
        let store = SqliteFavoriteStore::in_memory().unwrap();
        let first = store.observe_all();
        let second = store.observe_all();
        assert_eq!(store.observer_count(), 2);

        // Act
        drop(first);

        // Assert
        assert_eq!(store.observer_count(), 1);
        drop(second);
        assert_eq!(store.observer_count(), 0);
        store.upsert(&record("tt1")).unwrap();
    }

    #[test]
    fn test_new_subscriber_starts_at_latest_snapshot() {
        // Arrange
        let store = SqliteFavoriteStore::in_memory().unwrap();
        store.upsert(&record("tt1")).unwrap();

        // Act
        let rx = store.observe_all();

        // Assert
        assert_eq!(rx.borrow().len(), 1);
        assert!(store.exists_by_id("tt1").unwrap());
    }

    #[test]
    fn test_reopen_on_disk_keeps_records() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        {
            let store = SqliteFavoriteStore::open(Some(dir.path())).unwrap();
            store.upsert(&record("tt1")).unwrap();
        }

        // Act
        let reopened = SqliteFavoriteStore::open(Some(dir.path())).unwrap();

        // Assert
        assert_eq!(reopened.load_all().unwrap().len(), 1);
        assert_eq!(reopened.observe_all().borrow().len(), 1);
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        // Arrange
        let store = Arc::new(SqliteFavoriteStore::in_memory().unwrap());

        // Act
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        store.upsert(&record(&format!("tt{n}-{i}"))).unwrap();
                        store.load_all().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Assert
        assert_eq!(store.load_all().unwrap().len(), 40);
        assert_eq!(store.observe_all().borrow().len(), 40);
    }
}
