//! `OmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::OmdbError;
use super::types::{MovieDetail, SearchPage};

/// OMDb API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(OmdbApi: Send)]
pub trait LocalOmdbApi {
    /// Searches movies by title. `page` starts at 1.
    ///
    /// An upstream "not found" is a successful call whose page has
    /// `Response: "False"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, OMDb answers with a
    /// non-2xx status, or the body cannot be decoded.
    async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage, OmdbError>;

    /// Fetches the full record of one movie by IMDb ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, OMDb answers with a
    /// non-2xx status, or the body cannot be decoded.
    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError>;
}
