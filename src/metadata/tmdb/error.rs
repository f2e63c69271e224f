//! Error types shared by the TMDB metadata provider.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`TmdbError`] failures.
pub type TmdbResult<T> = Result<T, TmdbError>;

/// Failures that can occur while interacting with the TMDB API.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Required environment variable is missing.
    #[error("missing TMDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build TMDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send TMDB request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// TMDB returned an unexpected status code.
    #[error("unexpected TMDB response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode TMDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}
