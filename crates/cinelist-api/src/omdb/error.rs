//! `OmdbError` - failures surfaced by the OMDb client.

use std::fmt;

use reqwest::StatusCode;

/// A failed OMDb request.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum OmdbError {
    /// The exchange failed on the wire: refused or reset connection, DNS
    /// or TLS failure, timeout, or a body that could not be read.
    Connectivity(reqwest::Error),
    /// The request could not be built or its redirects could not be followed.
    Transport(reqwest::Error),
    /// OMDb answered with a non-2xx status.
    Status {
        /// HTTP status.
        status: StatusCode,
        /// `Error` field of the body, if it had one.
        message: Option<String>,
    },
    /// The body was not the expected JSON.
    Decode(serde_json::Error),
}

impl OmdbError {
    /// Classifies a `reqwest` failure. The request URL carries the API key
    /// and is stripped before the error is kept.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_builder() || err.is_redirect() || err.is_decode() || err.is_status() {
            Self::Transport(err)
        } else {
            Self::Connectivity(err)
        }
    }

    /// Returns `true` for [`OmdbError::Connectivity`].
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

impl fmt::Display for OmdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connectivity(err) => write!(f, "connection failed: {err}"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Status {
                status,
                message: Some(message),
            } => write!(f, "OMDb API error (HTTP {status}): {message}"),
            Self::Status {
                status,
                message: None,
            } => write!(f, "OMDb API error (HTTP {status})"),
            Self::Decode(err) => write!(f, "failed to decode OMDb response: {err}"),
        }
    }
}

impl std::error::Error for OmdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connectivity(err) | Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Status { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_status_display_includes_message() {
        // Arrange
        let err = OmdbError::Status {
            status: StatusCode::UNAUTHORIZED,
            message: Some(String::from("Invalid API key!")),
        };

        // Act
        let text = err.to_string();

        // Assert
        assert!(text.contains("401"));
        assert!(text.contains("Invalid API key!"));
        assert!(!err.is_connectivity());
    }

    #[test]
    fn test_decode_has_source() {
        // Arrange
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = OmdbError::Decode(json_err);

        // Act & Assert
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("failed to decode OMDb response"));
    }
}
