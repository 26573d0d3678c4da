//! Error types exposed by the Blogify API layer.

use thiserror::Error;

/// Errors surfaced while configuring or talking to the Blogify API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The configured API base URL could not be parsed or joined.
    #[error("API URL is invalid: {0}")]
    InvalidUrl(String),

    /// The API rejected the session token.
    #[error("API rejected the session: {message}")]
    Authentication {
        /// Server message returned with the 401/403 response.
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response message describing the failure.
        message: String,
    },

    /// Networking failed while calling the API.
    #[error("network error talking to the API: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {message}")]
    Timeout {
        /// Operation that timed out.
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("malformed API response: {message}")]
    Decode {
        /// Deserialisation error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

impl FeedError {
    /// Returns true when the failure came from the transport rather than the
    /// server's answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }
}
