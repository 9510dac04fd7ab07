//! `DetailsController` - one-shot detail fetch for a single movie.

use std::fmt;
use std::sync::Arc;

use cinelist_api::omdb::{LocalOmdbApi, MovieDetail};
use tokio::sync::watch;

use crate::repository::MovieRepository;

/// Holds the detail record and the last error for the detail screen.
///
/// Both are published on watch channels. A successful load does not clear
/// a previous error.
pub struct DetailsController<A> {
    repository: Arc<MovieRepository<A>>,
    detail: watch::Sender<Option<MovieDetail>>,
    error: watch::Sender<Option<String>>,
}

impl<A> fmt::Debug for DetailsController<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailsController")
            .field("detail", &self.detail.borrow().as_ref().map(|d| d.imdb_id.clone()))
            .field("error", &*self.error.borrow())
            .finish_non_exhaustive()
    }
}

impl<A: LocalOmdbApi> DetailsController<A> {
    /// Creates a controller with nothing loaded.
    #[must_use]
    pub fn new(repository: Arc<MovieRepository<A>>) -> Self {
        let (detail, _) = watch::channel(None);
        let (error, _) = watch::channel(None);
        Self {
            repository,
            detail,
            error,
        }
    }

    /// Fetches `imdb_id` once and publishes the record or the error message.
    /// Returns whether the fetch succeeded.
    pub async fn load_details(&self, imdb_id: &str) -> bool {
        match self.repository.movie_details(imdb_id).await {
            Ok(detail) => {
                tracing::info!(imdb_id, title = %detail.title, "details loaded");
                self.detail.send_replace(Some(detail));
                true
            }
            Err(err) => {
                self.error.send_replace(Some(err.to_string()));
                false
            }
        }
    }

    /// Latest loaded record.
    #[must_use]
    pub fn detail(&self) -> Option<MovieDetail> {
        self.detail.borrow().clone()
    }

    /// Latest error message.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    /// Subscribes to the detail record.
    #[must_use]
    pub fn subscribe_detail(&self) -> watch::Receiver<Option<MovieDetail>> {
        self.detail.subscribe()
    }

    /// Subscribes to the error message.
    #[must_use]
    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.error.subscribe()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::testing::{CountingStore, MockOmdbApi};

    fn detail(imdb_id: &str) -> MovieDetail {
        MovieDetail {
            imdb_id: String::from(imdb_id),
            title: String::from("Batman Begins"),
            director: String::from("Christopher Nolan"),
            response: String::from("True"),
            ..MovieDetail::default()
        }
    }

    fn controller(api: MockOmdbApi) -> DetailsController<MockOmdbApi> {
        let repo = MovieRepository::new(api, Arc::new(CountingStore::new())).unwrap();
        DetailsController::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_load_publishes_detail() {
        // Arrange
        let details = controller(MockOmdbApi::default().with_detail(detail("tt0372784")));
        let mut rx = details.subscribe_detail();

        // Act
        let ok = details.load_details("tt0372784").await;

        // Assert
        assert!(ok);
        assert!(rx.has_changed().unwrap());
        let loaded = rx.borrow_and_update().clone().unwrap();
        assert_eq!(loaded.director, "Christopher Nolan");
        assert!(details.error().is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_publishes_fixed_message_once() {
        // Arrange
        let details = controller(MockOmdbApi::default());
        let mut errors = details.subscribe_error();

        // Act
        let ok = details.load_details("tt-unknown").await;

        // Assert: no retry
        assert!(!ok);
        assert_eq!(details.repository.api().detail_calls(), 1);
        assert!(errors.has_changed().unwrap());
        assert_eq!(
            errors.borrow_and_update().as_deref(),
            Some("Error fetching movie details")
        );
        assert!(details.detail().is_none());
    }

    #[tokio::test]
    async fn test_success_keeps_previous_error() {
        // Arrange
        let details = controller(MockOmdbApi::default().with_detail(detail("tt1")));
        details.load_details("tt-unknown").await;

        // Act
        details.load_details("tt1").await;

        // Assert
        assert_eq!(details.detail().unwrap().imdb_id, "tt1");
        assert!(details.error().is_some());
    }
}
