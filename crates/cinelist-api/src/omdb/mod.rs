//! OMDb API client module.
//!
//! Handles title search and per-movie detail requests against the
//! OMDb endpoint.

mod api;
mod client;
mod error;
mod rate_limiter;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalOmdbApi, OmdbApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{OmdbClient, OmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use error::OmdbError;
pub use types::{MovieDetail, MovieSummary, PAGE_SIZE, RESPONSE_TRUE, SearchPage};
