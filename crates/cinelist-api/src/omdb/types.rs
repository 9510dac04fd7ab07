//! OMDb API response types.

use serde::{Deserialize, Serialize};

/// Number of results OMDb returns per search page.
pub const PAGE_SIZE: u32 = 10;

/// Value of the `Response` field on success.
pub const RESPONSE_TRUE: &str = "True";

// --- Search ---

/// Response from the `?s=` search endpoint.
///
/// On an upstream failure (`Response: "False"`) the `Search` list is absent
/// and `Error` carries the reason. An absent list is not "zero results".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchPage {
    /// Movies on this page (absent on failure).
    #[serde(rename = "Search", default)]
    pub movies: Option<Vec<MovieSummary>>,
    /// `"True"` or `"False"`.
    #[serde(rename = "Response")]
    pub response: String,
    /// Upstream error message (present iff `response` is `"False"`).
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    /// Total number of matches, string-encoded.
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}

impl SearchPage {
    /// Returns `true` when OMDb reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response == RESPONSE_TRUE
    }

    /// Parses `totalResults`. Returns `None` if absent or not a number.
    #[must_use]
    pub fn total_result_count(&self) -> Option<u32> {
        self.total_results.as_deref()?.trim().parse().ok()
    }

    /// Number of full pages: `floor(totalResults / PAGE_SIZE)`.
    ///
    /// A trailing partial page is not counted.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_result_count()
            .map_or(0, |count| count.checked_div(PAGE_SIZE).unwrap_or(0))
    }
}

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MovieSummary {
    /// IMDb ID (e.g. `tt0372784`). Primary key everywhere.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year as OMDb reports it (`"2005"`, `"2005–2008"`).
    #[serde(rename = "Year", default)]
    pub year: String,
    /// Poster URL (`"N/A"` when missing).
    #[serde(rename = "Poster", default)]
    pub poster: String,
    /// `movie`, `series`, `episode` or `game`.
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// Local favorite overlay. Never part of the API payload.
    #[serde(skip)]
    pub favorite: bool,
}

// --- Details ---

/// Response from the `?i=` detail endpoint.
///
/// OMDb answers an unknown ID with HTTP 200 and
/// `{"Response":"False","Error":"..."}`, so every descriptive field is
/// defaulted and callers must check [`MovieDetail::is_success`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MovieDetail {
    /// IMDb ID.
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    /// Title.
    #[serde(rename = "Title")]
    pub title: String,
    /// Release year.
    #[serde(rename = "Year")]
    pub year: String,
    /// Comma-separated genres.
    #[serde(rename = "Genre")]
    pub genre: String,
    /// Director(s).
    #[serde(rename = "Director")]
    pub director: String,
    /// Writer(s).
    #[serde(rename = "Writer")]
    pub writer: String,
    /// Main cast.
    #[serde(rename = "Actors")]
    pub actors: String,
    /// Plot summary.
    #[serde(rename = "Plot")]
    pub plot: String,
    /// Poster URL.
    #[serde(rename = "Poster")]
    pub poster: String,
    /// `movie`, `series`, `episode` or `game`.
    #[serde(rename = "Type")]
    pub kind: String,
    /// `"True"` or `"False"`.
    #[serde(rename = "Response")]
    pub response: String,
    /// Upstream error message.
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MovieDetail {
    /// Returns `true` when OMDb reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response == RESPONSE_TRUE
    }
}

// --- Error body ---

/// Error body OMDb sends alongside non-2xx statuses (e.g. 401 for a bad key).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OmdbErrorBody {
    /// Reason.
    #[serde(rename = "Error")]
    pub error: String,
}
