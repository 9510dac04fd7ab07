//! `OmdbClient` - OMDb API client implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalOmdbApi;
use super::error::OmdbError;
use super::rate_limiter::OmdbRateLimiter;
use super::types::{MovieDetail, OmdbErrorBody, SearchPage};

/// Default OMDb endpoint. Every operation is a GET on the root path.
const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDb API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Endpoint URL.
    base_url: Url,
    /// `apikey` query parameter.
    api_key: String,
    /// Request pacing.
    rate_limiter: Arc<Mutex<OmdbRateLimiter>>,
}

/// Builder for `OmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct OmdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
    timeout: Option<Duration>,
}

impl OmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            min_interval: None,
            timeout: None,
        }
    }

    /// Overrides the endpoint URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the OMDb API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 100ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Sets a whole-request timeout. Without one the transport default applies.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set or empty.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<OmdbClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .context("api_key is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL).context("invalid default base URL")?
        };

        let rate_limiter = self
            .min_interval
            .map_or_else(OmdbRateLimiter::default_interval, OmdbRateLimiter::new);

        let mut http_builder = Client::builder().user_agent(&user_agent).gzip(true);
        if let Some(timeout) = self.timeout {
            http_builder = http_builder.timeout(timeout);
        }
        let http_client = http_builder
            .build()
            .context("failed to build HTTP client")?;

        Ok(OmdbClient {
            http_client,
            base_url,
            api_key,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }
}

impl OmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> OmdbClientBuilder {
        OmdbClientBuilder::new()
    }

    /// Sends a paced GET with the given query and decodes the JSON body.
    ///
    /// Non-2xx answers become [`OmdbError::Status`], keeping the body's
    /// `Error` text when OMDb sent one.
    #[instrument(skip_all)]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<T, OmdbError> {
        self.rate_limiter.lock().await.acquire().await;

        let request = self
            .http_client
            .get(self.base_url.clone())
            .query(query)
            .build()
            .map_err(OmdbError::from_reqwest)?;

        // The full URL carries the API key; log the operation only.
        tracing::debug!(
            params = ?query.iter().map(|(k, _)| *k).filter(|k| *k != "apikey").collect::<Vec<_>>(),
            "OMDb API request"
        );

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(OmdbError::from_reqwest)?;
        let status = response.status();
        let body = response.text().await.map_err(OmdbError::from_reqwest)?;

        if !status.is_success() {
            let message = serde_json::from_str::<OmdbErrorBody>(&body)
                .ok()
                .map(|b| b.error);
            tracing::warn!(%status, message = message.as_deref().unwrap_or("-"), "OMDb API error");
            return Err(OmdbError::Status { status, message });
        }

        serde_json::from_str(&body).map_err(OmdbError::Decode)
    }
}

impl LocalOmdbApi for OmdbClient {
    #[instrument(skip_all, fields(page = page))]
    async fn search_movies(&self, query: &str, page: u32) -> Result<SearchPage, OmdbError> {
        let page = page.to_string();
        let params = [
            ("apikey", self.api_key.as_str()),
            ("s", query),
            ("page", page.as_str()),
        ];
        self.get_json(&params).await
    }

    #[instrument(skip_all, fields(imdb_id = %imdb_id))]
    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError> {
        let params = [("i", imdb_id), ("apikey", self.api_key.as_str())];
        self.get_json(&params).await
    }
}
