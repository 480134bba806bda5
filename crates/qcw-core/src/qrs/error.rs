//! Errors from a single QRS request.

use super::Method;

#[derive(Debug, thiserror::Error)]
pub enum QrsError {
    /// libcurl reported an error (DNS, TLS, timeout, connection refused...).
    #[error("{0}")]
    Curl(#[from] curl::Error),

    /// The server answered with a non-2xx status.
    #[error("{method} {path} returned HTTP {status}")]
    Status {
        method: Method,
        path: String,
        status: u32,
    },

    /// The response body was not the expected JSON.
    #[error("decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}
