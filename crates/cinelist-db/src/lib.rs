//! Local persistence for cinelist.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep the single `favorites` table
//! and publishes its contents to observers on every write.

mod connection;
/// Favorite record CRUD operations.
pub mod favorites;
mod migrations;
mod store;

#[allow(clippy::module_name_repetitions)]
pub use connection::{open_db, open_in_memory};
pub use favorites::FavoriteRecord;
#[allow(clippy::module_name_repetitions)]
pub use store::{FavoriteStore, SqliteFavoriteStore};
