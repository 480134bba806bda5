//! Client certificate bundle exported from the QRS.
//!
//! The server exports `client.pem`, `client_key.pem` and `root.pem`. The
//! bundle is validated once at startup and shared read-only by every
//! connection.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

pub const CLIENT_CERT_FILE: &str = "client.pem";
pub const CLIENT_KEY_FILE: &str = "client_key.pem";
pub const ROOT_CERT_FILE: &str = "root.pem";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertBundle {
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
    /// Trust anchor for the server certificate; system store when absent.
    pub root_cert: Option<PathBuf>,
}

impl CertBundle {
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        if !dir.is_dir() {
            return Err(ConfigError::MissingCertDir(dir.to_path_buf()));
        }
        let client_cert = require(dir, CLIENT_CERT_FILE)?;
        let client_key = require(dir, CLIENT_KEY_FILE)?;
        let root = dir.join(ROOT_CERT_FILE);
        let root_cert = root.is_file().then_some(root);

        tracing::debug!(dir = %dir.display(), has_root = root_cert.is_some(), "loaded certificate bundle");
        Ok(Self {
            client_cert,
            client_key,
            root_cert,
        })
    }
}

fn require(dir: &Path, name: &str) -> Result<PathBuf, ConfigError> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::MissingCertFile(path))
    }
}
