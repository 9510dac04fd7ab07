//! `MovieRepository` - OMDb fetches plus the local favorites store.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use cinelist_api::omdb::{LocalOmdbApi, MovieDetail, MovieSummary, OmdbError, SearchPage};
use cinelist_db::{FavoriteRecord, FavoriteStore};
use tokio::sync::watch;
use tracing::instrument;

use crate::error::FetchError;
use crate::writer::FavoriteWriter;

/// Fallback when OMDb reports a failure without an `Error` field.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Network reachability probe consulted before every fetch.
pub trait Connectivity: Send + Sync {
    /// Returns `false` when no network path is available.
    fn is_online(&self) -> bool;
}

/// Probe that never reports offline; the request itself decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Single entry point for movie data.
///
/// Fetches go to OMDb and come back either as a payload or as a
/// [`FetchError`] whose `Display` is ready for the user. Favorite
/// mutations are queued on a background writer and never block.
pub struct MovieRepository<A> {
    api: A,
    store: Arc<dyn FavoriteStore>,
    writer: FavoriteWriter,
    connectivity: Arc<dyn Connectivity>,
}

impl<A> fmt::Debug for MovieRepository<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovieRepository")
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl<A: LocalOmdbApi> MovieRepository<A> {
    /// Creates a repository and starts its favorites writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer thread cannot be started.
    pub fn new(api: A, store: Arc<dyn FavoriteStore>) -> Result<Self> {
        let writer = FavoriteWriter::spawn(Arc::clone(&store))?;
        Ok(Self {
            api,
            store,
            writer,
            connectivity: Arc::new(AlwaysOnline),
        })
    }

    /// Replaces the reachability probe.
    #[must_use]
    pub fn with_connectivity(mut self, probe: Arc<dyn Connectivity>) -> Self {
        self.connectivity = probe;
        self
    }

    /// Fetches one page of search results.
    ///
    /// A successful page always carries its movie list.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Connectivity`] when offline or the connection fails
    /// - [`FetchError::Upstream`] with OMDb's reason for `Response: "False"`
    /// - [`FetchError::Transport`] for any other failure
    #[instrument(skip(self), err(Display))]
    pub async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage, FetchError> {
        if !self.connectivity.is_online() {
            return Err(FetchError::Connectivity);
        }
        match self.api.search_movies(query, page).await {
            Ok(result) if result.is_success() && result.movies.is_some() => {
                tracing::debug!(
                    movies = result.movies.as_ref().map_or(0, Vec::len),
                    total_pages = result.total_pages(),
                    "search page fetched"
                );
                Ok(result)
            }
            Ok(result) if result.is_success() => Err(FetchError::Transport(String::from(
                "OMDb search response has no result list",
            ))),
            Ok(result) => Err(FetchError::Upstream(
                result.error.unwrap_or_else(|| String::from(UNKNOWN_ERROR)),
            )),
            Err(err) => Err(search_error(err)),
        }
    }

    /// Fetches the full record for one IMDb ID.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Connectivity`] when the probe reports offline
    /// - [`FetchError::Transport`] with the client's message when the
    ///   request or decoding fails
    /// - [`FetchError::DetailFetch`] for any upstream failure
    #[instrument(skip(self), err(Display))]
    pub async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetail, FetchError> {
        if !self.connectivity.is_online() {
            return Err(FetchError::Connectivity);
        }
        match self.api.movie_details(imdb_id).await {
            Ok(detail) if detail.is_success() => Ok(detail),
            Ok(detail) => {
                tracing::debug!(
                    reason = detail.error.as_deref().unwrap_or(UNKNOWN_ERROR),
                    "OMDb rejected detail request"
                );
                Err(FetchError::DetailFetch)
            }
            Err(err) => Err(detail_error(err)),
        }
    }

    /// Flips the stored favorite state of `movie`.
    ///
    /// `movie.favorite` is the state *before* the flip: `true` queues a
    /// delete, `false` queues an upsert of the movie's fields.
    pub fn toggle_favorite(&self, movie: &MovieSummary) {
        if movie.favorite {
            self.writer.delete(movie.imdb_id.clone());
        } else {
            self.writer.upsert(favorite_from_summary(movie));
        }
    }

    /// Waits until all queued favorite writes have been applied.
    pub async fn flush_favorites(&self) {
        self.writer.flush().await;
    }

    /// Subscribes to the favorites table.
    #[must_use]
    pub fn observe_favorites(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.store.observe_all()
    }

    #[cfg(test)]
    pub(crate) const fn api(&self) -> &A {
        &self.api
    }

    /// Point lookup in the favorites table.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_favorite(&self, imdb_id: &str) -> Result<bool> {
        self.store.exists_by_id(imdb_id)
    }
}

fn search_error(err: OmdbError) -> FetchError {
    match err {
        OmdbError::Connectivity(_) => FetchError::Connectivity,
        OmdbError::Status {
            message: Some(message),
            ..
        } => FetchError::Upstream(message),
        other => FetchError::Transport(other.to_string()),
    }
}

fn detail_error(err: OmdbError) -> FetchError {
    match err {
        OmdbError::Status { .. } => FetchError::DetailFetch,
        other => FetchError::Transport(other.to_string()),
    }
}

/// Copies the persisted fields of a search result.
#[must_use]
pub fn favorite_from_summary(movie: &MovieSummary) -> FavoriteRecord {
    FavoriteRecord {
        imdb_id: movie.imdb_id.clone(),
        title: movie.title.clone(),
        year: movie.year.clone(),
        poster: movie.poster.clone(),
        kind: movie.kind.clone(),
    }
}

/// Rebuilds a summary from a stored favorite, flagged as favorite.
#[must_use]
pub fn summary_from_favorite(record: &FavoriteRecord) -> MovieSummary {
    MovieSummary {
        imdb_id: record.imdb_id.clone(),
        title: record.title.clone(),
        year: record.year.clone(),
        poster: record.poster.clone(),
        kind: record.kind.clone(),
        favorite: true,
    }
}

/// Copies the persisted fields of a detail record.
#[must_use]
pub fn favorite_from_detail(detail: &MovieDetail) -> FavoriteRecord {
    FavoriteRecord {
        imdb_id: detail.imdb_id.clone(),
        title: detail.title.clone(),
        year: detail.year.clone(),
        poster: detail.poster.clone(),
        kind: detail.kind.clone(),
    }
}
