//! Configuration errors. Each one aborts the run before any request is made.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid server URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),

    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("thread count must be at least 1")]
    NoWorkers,

    #[error("certificate directory {} does not exist", .0.display())]
    MissingCertDir(PathBuf),

    #[error("certificate file {} does not exist", .0.display())]
    MissingCertFile(PathBuf),

    #[error("user file {} does not exist", .0.display())]
    MissingUserFile(PathBuf),
}
