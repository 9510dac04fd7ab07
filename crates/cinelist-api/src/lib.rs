//! API client library for cinelist.
//!
//! Provides the client for the OMDb movie database API.

/// OMDb API client.
pub mod omdb;
