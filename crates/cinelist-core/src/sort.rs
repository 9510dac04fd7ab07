//! Client-side ordering of loaded search results.

use std::fmt;
use std::str::FromStr;

use cinelist_api::omdb::MovieSummary;

/// Sort selector, labelled the way the selector shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// The "Select sort" placeholder: no ordering applied.
    #[default]
    None,
    /// Ascending by the `year` string.
    ByYear,
    /// Ascending by title.
    ByTitle,
}

impl SortOption {
    /// All options in selector order.
    pub const ALL: [Self; 3] = [Self::None, Self::ByYear, Self::ByTitle];

    /// Selector label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Select sort",
            Self::ByYear => "Sort by Year",
            Self::ByTitle => "Sort by Title",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised sort label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortOptionError(String);

impl fmt::Display for ParseSortOptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown sort option {:?} (expected \"year\", \"title\" or \"none\")",
            self.0
        )
    }
}

impl std::error::Error for ParseSortOptionError {}

impl FromStr for SortOption {
    type Err = ParseSortOptionError;

    /// Accepts the selector labels and the short forms `none`, `year`, `title`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(option) = Self::ALL.into_iter().find(|o| o.label() == trimmed) {
            return Ok(option);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "year" => Ok(Self::ByYear),
            "title" => Ok(Self::ByTitle),
            _ => Err(ParseSortOptionError(String::from(s))),
        }
    }
}

/// Returns a sorted copy of `movies`.
///
/// Both keys compare as plain strings, so `"2020"` sorts before `"99"`.
/// The sort is stable: equal keys keep their loaded order.
#[must_use]
pub fn sort_movies(movies: &[MovieSummary], option: SortOption) -> Vec<MovieSummary> {
    let mut sorted = movies.to_vec();
    match option {
        SortOption::None => {}
        SortOption::ByYear => sorted.sort_by(|a, b| a.year.cmp(&b.year)),
        SortOption::ByTitle => sorted.sort_by(|a, b| a.title.cmp(&b.title)),
    }
    sorted
}
