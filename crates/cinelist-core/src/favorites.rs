//! `FavoritesController` - live view of the favorites table.

use cinelist_api::omdb::{LocalOmdbApi, MovieSummary};
use cinelist_db::FavoriteRecord;
use tokio::sync::watch;

use crate::repository::{MovieRepository, summary_from_favorite};

/// Follows the favorites table for the favorites screen.
#[derive(Debug)]
pub struct FavoritesController {
    favorites: watch::Receiver<Vec<FavoriteRecord>>,
}

impl FavoritesController {
    /// Subscribes to the repository's favorites.
    #[must_use]
    pub fn new<A: LocalOmdbApi>(repository: &MovieRepository<A>) -> Self {
        Self {
            favorites: repository.observe_favorites(),
        }
    }

    /// Current favorites, in insertion order, as list rows.
    pub fn favorites(&mut self) -> Vec<MovieSummary> {
        self.favorites
            .borrow_and_update()
            .iter()
            .map(summary_from_favorite)
            .collect()
    }

    /// Waits for the next change and returns the new contents, or `None`
    /// once the store is gone.
    pub async fn changed(&mut self) -> Option<Vec<MovieSummary>> {
        self.favorites.changed().await.ok()?;
        Some(self.favorites())
    }
}
