//! Error types raised while loading and sampling the playlist catalog.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CatalogError`] failures.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures that can occur while building or drawing from the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build playlist HTTP client")]
    ClientBuilder {
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// A page request could not be sent.
    #[error("failed to fetch playlist page `{uri}`")]
    RequestSend {
        /// Page URI.
        uri: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The playlist provider answered with a non-success status.
    #[error("unexpected status {status} for playlist page `{uri}`")]
    RequestStatus {
        /// Page URI.
        uri: String,
        /// Status returned by the provider.
        status: StatusCode,
    },
    /// The page body was not a valid playlist document.
    #[error("failed to decode playlist page `{uri}`")]
    DecodeResponse {
        /// Page URI.
        uri: String,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// A `next` link pointed back at a page that was already fetched.
    #[error("playlist pagination loops back to `{uri}`")]
    PaginationLoop {
        /// URI visited twice.
        uri: String,
    },
    /// No playable song is available.
    #[error("catalog contains no playable song")]
    EmptyCatalog,
}
