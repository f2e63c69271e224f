use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB calls.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures of the CouchDB history backend, keyed by the endpoint involved.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// `from_env` found no base URL.
    #[error("CouchDB history store needs `{var}` to be set")]
    MissingEnvVar { var: &'static str },
    /// TLS or proxy setup of the client failed.
    #[error("could not build the CouchDB HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got a response (connection refused, timeout, ...).
    #[error("CouchDB endpoint `{endpoint}` unreachable")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with a status the operation does not accept.
    #[error("CouchDB endpoint `{endpoint}` answered {status}")]
    Rejected {
        endpoint: String,
        status: StatusCode,
    },
    /// A JSON body did not match the expected shape.
    #[error("CouchDB endpoint `{endpoint}` returned an unreadable body")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// A document in the database is not a completed connection.
    #[error("document `{doc_id}` is not a completed connection: {reason}")]
    ForeignDocument { doc_id: String, reason: &'static str },
}

impl CouchDaoError {
    pub(super) fn unreachable(endpoint: &str) -> impl FnOnce(reqwest::Error) -> Self + '_ {
        move |source| CouchDaoError::Unreachable {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(super) fn rejected(endpoint: &str, status: StatusCode) -> Self {
        CouchDaoError::Rejected {
            endpoint: endpoint.to_string(),
            status,
        }
    }
}
