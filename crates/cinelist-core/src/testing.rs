//! Shared fakes for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use cinelist_api::omdb::{
    LocalOmdbApi, MovieDetail, MovieSummary, OmdbError, RESPONSE_TRUE, SearchPage,
};
use cinelist_db::{FavoriteRecord, FavoriteStore, SqliteFavoriteStore};
use tokio::sync::watch;

pub fn favorite_record(imdb_id: &str) -> FavoriteRecord {
    FavoriteRecord {
        imdb_id: String::from(imdb_id),
        title: format!("Title {imdb_id}"),
        year: String::from("2001"),
        poster: String::from("N/A"),
        kind: String::from("movie"),
    }
}

pub fn movie(imdb_id: &str, title: &str, year: &str) -> MovieSummary {
    MovieSummary {
        imdb_id: String::from(imdb_id),
        title: String::from(title),
        year: String::from(year),
        poster: String::from("N/A"),
        kind: String::from("movie"),
        favorite: false,
    }
}

pub fn success_page(movies: Vec<MovieSummary>, total_results: u32) -> SearchPage {
    SearchPage {
        movies: Some(movies),
        response: String::from(RESPONSE_TRUE),
        error: None,
        total_results: Some(total_results.to_string()),
    }
}

pub fn failed_page(error: &str) -> SearchPage {
    SearchPage {
        movies: None,
        response: String::from("False"),
        error: Some(String::from(error)),
        total_results: None,
    }
}

/// Scripted OMDb API. Pages are keyed by page number and shared across
/// queries; unknown pages answer "Movie not found!".
#[derive(Debug, Default)]
pub struct MockOmdbApi {
    pages: Mutex<HashMap<u32, SearchPage>>,
    details: Mutex<HashMap<String, MovieDetail>>,
    search_calls: Mutex<Vec<(String, u32)>>,
    detail_calls: AtomicUsize,
}

impl MockOmdbApi {
    pub fn with_page(self, page: u32, response: SearchPage) -> Self {
        self.pages.lock().unwrap().insert(page, response);
        self
    }

    pub fn with_detail(self, detail: MovieDetail) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(detail.imdb_id.clone(), detail);
        self
    }

    pub fn search_calls(&self) -> Vec<(String, u32)> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

impl LocalOmdbApi for MockOmdbApi {
    async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage, OmdbError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((String::from(query), page));
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or_else(|| failed_page("Movie not found!")))
    }

    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .details
            .lock()
            .unwrap()
            .get(imdb_id)
            .cloned()
            .unwrap_or_else(|| MovieDetail {
                response: String::from("False"),
                error: Some(String::from("Incorrect IMDb ID.")),
                ..MovieDetail::default()
            }))
    }
}

/// In-memory store that counts mutation calls.
#[derive(Debug)]
pub struct CountingStore {
    inner: SqliteFavoriteStore,
    upserts: AtomicUsize,
    deletes: AtomicUsize,
    fail_upserts: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteFavoriteStore::in_memory().unwrap(),
            upserts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_upserts: false,
        }
    }

    pub fn failing_upserts() -> Self {
        Self {
            fail_upserts: true,
            ..Self::new()
        }
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

impl FavoriteStore for CountingStore {
    fn upsert(&self, record: &FavoriteRecord) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_upserts {
            bail!("disk full");
        }
        self.inner.upsert(record)
    }

    fn delete_by_id(&self, imdb_id: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_id(imdb_id)
    }

    fn exists_by_id(&self, imdb_id: &str) -> Result<bool> {
        self.inner.exists_by_id(imdb_id)
    }

    fn load_all(&self) -> Result<Vec<FavoriteRecord>> {
        self.inner.load_all()
    }

    fn observe_all(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.inner.observe_all()
    }
}
