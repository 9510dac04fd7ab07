//! Application configuration module.
//!
//! Manages the TOML config file holding OMDb access settings and the
//! default search query.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_KEY_ENV, AppConfig};
pub use paths::resolve_config_path;
