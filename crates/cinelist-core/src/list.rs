//! `ListController` - paginated search results with favorite overlay.
//!
//! The controller owns the accumulated result list for the active query.
//! Loading is split into [`ListController::begin_load`] and
//! [`ListController::apply_page`] so a caller can run the fetch anywhere;
//! [`ListController::load_next_page`] chains the two.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use cinelist_api::omdb::{LocalOmdbApi, MovieSummary, SearchPage};
use cinelist_db::FavoriteRecord;
use tokio::sync::watch;

use crate::error::FetchError;
use crate::repository::MovieRepository;
use crate::sort::{SortOption, sort_movies};

/// Query used when a refresh finds no active query.
pub const DEFAULT_QUERY: &str = "batman";

/// Sets `favorite` on every movie whose ID is in `favorites`, clears it elsewhere.
pub fn reconcile_favorites(movies: &mut [MovieSummary], favorites: &[FavoriteRecord]) {
    let ids: HashSet<&str> = favorites.iter().map(|f| f.imdb_id.as_str()).collect();
    for movie in movies {
        movie.favorite = ids.contains(movie.imdb_id.as_str());
    }
}

/// Load status of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListState {
    /// Nothing requested yet for the active query.
    #[default]
    Idle,
    /// A page request is in flight.
    Loading,
    /// The last request succeeded.
    Loaded,
    /// The last request failed; see [`ListController::error`].
    Error,
}

/// A page request handed out by [`ListController::begin_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    generation: u64,
    /// Query to search.
    pub query: String,
    /// 1-based page number.
    pub page: u32,
}

/// State holder for the search list screen.
pub struct ListController<A> {
    repository: Arc<MovieRepository<A>>,
    favorites: watch::Receiver<Vec<FavoriteRecord>>,
    default_query: String,
    query: String,
    /// Last page applied for `query`; 0 before the first.
    current_page: u32,
    total_pages: u32,
    movies: Vec<MovieSummary>,
    sort: SortOption,
    sorted: Vec<MovieSummary>,
    state: ListState,
    error: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
}

impl<A> fmt::Debug for ListController<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListController")
            .field("query", &self.query)
            .field("current_page", &self.current_page)
            .field("total_pages", &self.total_pages)
            .field("movies", &self.movies.len())
            .field("sort", &self.sort)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<A: LocalOmdbApi> ListController<A> {
    /// Creates an idle controller with the active query set to `default_query`.
    #[must_use]
    pub fn new(repository: Arc<MovieRepository<A>>, default_query: impl Into<String>) -> Self {
        let favorites = repository.observe_favorites();
        let default_query = default_query.into();
        Self {
            repository,
            favorites,
            query: default_query.clone(),
            default_query,
            current_page: 0,
            total_pages: 0,
            movies: Vec::new(),
            sort: SortOption::None,
            sorted: Vec::new(),
            state: ListState::Idle,
            error: None,
            generation: 0,
            in_flight: None,
        }
    }

    /// Active query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Last page applied for the active query (0 when none).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Full pages available for the active query, from the last response.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Accumulated results in load order.
    #[must_use]
    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    /// Sorted view of the accumulated results (empty until a sort is applied).
    #[must_use]
    pub fn sorted_movies(&self) -> &[MovieSummary] {
        &self.sorted
    }

    /// What the list shows: the sorted view when a sort is selected.
    #[must_use]
    pub fn visible_movies(&self) -> &[MovieSummary] {
        match self.sort {
            SortOption::None => &self.movies,
            SortOption::ByYear | SortOption::ByTitle => &self.sorted,
        }
    }

    /// Selected sort.
    #[must_use]
    pub const fn sort_option(&self) -> SortOption {
        self.sort
    }

    /// Load status.
    #[must_use]
    pub const fn state(&self) -> ListState {
        self.state
    }

    /// Whether a page request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message of the last failed load, until the next load starts.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Page the next load would request, or `None` when exhausted.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.current_page == 0 {
            Some(1)
        } else if self.current_page < self.total_pages {
            self.current_page.checked_add(1)
        } else {
            None
        }
    }

    /// Whether more pages can be requested.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_page().is_some()
    }

    /// Starts loading the next page.
    ///
    /// Returns `None` while another load is in flight or when the last page
    /// has been reached.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            tracing::debug!("page load already in flight");
            return None;
        }
        let page = self.next_page()?;
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = Some(self.generation);
        self.state = ListState::Loading;
        self.error = None;
        Some(PageRequest {
            generation: self.generation,
            query: self.query.clone(),
            page,
        })
    }

    /// Applies the outcome of `request`. Returns `false` if the request was
    /// superseded by a new search or refresh and the result was dropped.
    ///
    /// Page 1 replaces the list, later pages append. A failure keeps the
    /// list and page counter as they were.
    pub fn apply_page(
        &mut self,
        request: &PageRequest,
        result: Result<SearchPage, FetchError>,
    ) -> bool {
        if self.in_flight != Some(request.generation) {
            tracing::debug!(
                query = %request.query,
                page = request.page,
                "dropping superseded page"
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let total_pages = page.total_pages();
                let movies = page.movies.unwrap_or_default();
                if request.page == 1 {
                    self.movies = movies;
                } else {
                    self.movies.extend(movies);
                }
                self.current_page = request.page;
                self.total_pages = total_pages;
                // The snapshot may have moved since the last page; reconcile all of them.
                self.apply_favorites();
                self.resort();
                self.state = ListState::Loaded;
                tracing::info!(
                    query = %request.query,
                    page = request.page,
                    total_pages,
                    movies = self.movies.len(),
                    "page loaded"
                );
            }
            Err(err) => {
                tracing::warn!(
                    query = %request.query,
                    page = request.page,
                    error = %err,
                    "page load failed"
                );
                self.state = ListState::Error;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Fetches and applies the next page. Returns `false` when nothing was
    /// requested or the result was dropped.
    pub async fn load_next_page(&mut self) -> bool {
        let Some(request) = self.begin_load() else {
            return false;
        };
        let result = self
            .repository
            .search_movies(&request.query, request.page)
            .await;
        self.apply_page(&request, result)
    }

    /// Starts a new search from page 1. A blank query is ignored.
    pub async fn submit_search(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("ignoring blank search");
            return false;
        }
        self.restart(String::from(query));
        self.load_next_page().await
    }

    /// Reloads page 1 of the active query (or the default query when none)
    /// and clears the selected sort.
    pub async fn refresh(&mut self) -> bool {
        let query = if self.query.trim().is_empty() {
            self.default_query.clone()
        } else {
            self.query.clone()
        };
        self.sort = SortOption::None;
        self.restart(query);
        self.load_next_page().await
    }

    /// Orders the accumulated results. `SortOption::None` keeps the
    /// current view, as does an empty list.
    pub fn sort(&mut self, option: SortOption) {
        if option == SortOption::None || self.movies.is_empty() {
            return;
        }
        self.sort = option;
        self.sorted = sort_movies(&self.movies, option);
    }

    /// Flips the favorite flag of `imdb_id` right away and queues the store
    /// write. Returns the new flag, or `None` if the movie is not loaded.
    pub fn toggle_favorite(&mut self, imdb_id: &str) -> Option<bool> {
        let movie = self.movies.iter_mut().find(|m| m.imdb_id == imdb_id)?;
        let before = movie.clone();
        movie.favorite = !before.favorite;
        for sorted in self.sorted.iter_mut().filter(|m| m.imdb_id == imdb_id) {
            sorted.favorite = !before.favorite;
        }
        self.repository.toggle_favorite(&before);
        Some(!before.favorite)
    }

    /// Re-applies the favorites snapshot if it changed. Returns whether it did.
    pub fn sync_favorites(&mut self) -> bool {
        if !self.favorites.has_changed().unwrap_or(false) {
            return false;
        }
        self.apply_favorites();
        true
    }

    /// Waits for the next favorites change and re-applies it.
    /// Returns `false` once the store is gone.
    pub async fn favorites_changed(&mut self) -> bool {
        if self.favorites.changed().await.is_err() {
            return false;
        }
        self.apply_favorites();
        true
    }

    fn apply_favorites(&mut self) {
        let favorites = self.favorites.borrow_and_update().clone();
        reconcile_favorites(&mut self.movies, &favorites);
        reconcile_favorites(&mut self.sorted, &favorites);
    }

    fn restart(&mut self, query: String) {
        self.query = query;
        self.current_page = 0;
        self.total_pages = 0;
        self.movies.clear();
        self.sorted.clear();
        self.in_flight = None;
        self.state = ListState::Idle;
        self.error = None;
    }

    fn resort(&mut self) {
        if self.sort != SortOption::None {
            self.sorted = sort_movies(&self.movies, self.sort);
        }
    }
}
