//! `FetchError` - display-ready failures of repository fetches.

use std::fmt;

/// Message shown for connectivity failures.
pub const NO_INTERNET_MESSAGE: &str = "No internet connection";

/// Message shown for any non-transport failure of a detail fetch.
pub const DETAIL_FETCH_MESSAGE: &str = "Error fetching movie details";

/// Why a search or detail fetch failed.
///
/// `Display` renders the string a controller puts on its error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum FetchError {
    /// No network path (offline probe, refused connection, timeout).
    Connectivity,
    /// The request failed after being sent; carries the client's message.
    Transport(String),
    /// OMDb answered but reported a logical failure (e.g. "Movie not found!").
    Upstream(String),
    /// Detail fetch failed upstream. The cause is deliberately not kept.
    DetailFetch,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connectivity => f.write_str(NO_INTERNET_MESSAGE),
            Self::Transport(message) | Self::Upstream(message) => f.write_str(message),
            Self::DetailFetch => f.write_str(DETAIL_FETCH_MESSAGE),
        }
    }
}

impl std::error::Error for FetchError {}
