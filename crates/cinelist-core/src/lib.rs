//! Movie browsing core for cinelist.
//!
//! [`MovieRepository`] combines the OMDb client with the local favorites
//! store. The controllers hold per-screen state on top of it: the paginated
//! search list, the detail view and the favorites list.

mod details;
mod error;
mod favorites;
mod list;
mod repository;
mod sort;
#[cfg(test)]
mod testing;
mod writer;

pub use details::DetailsController;
pub use error::{DETAIL_FETCH_MESSAGE, FetchError, NO_INTERNET_MESSAGE};
pub use favorites::FavoritesController;
pub use list::{DEFAULT_QUERY, ListController, ListState, PageRequest, reconcile_favorites};
pub use repository::{
    AlwaysOnline, Connectivity, MovieRepository, favorite_from_detail, favorite_from_summary,
    summary_from_favorite,
};
pub use sort::{ParseSortOptionError, SortOption, sort_movies};
pub use writer::FavoriteWriter;
