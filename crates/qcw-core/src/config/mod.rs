//! Configuration: optional defaults file plus command-line overrides,
//! resolved once into immutable settings.

mod error;
mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub use error::ConfigError;
pub use settings::{ServerOverrides, ServerSettings, WarmOverrides, WarmSettings};

/// Default QRS port.
pub const DEFAULT_PORT: u16 = 4242;
/// Default worker count.
pub const DEFAULT_THREADS: usize = 4;
/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Defaults loaded from `~/.config/qcw/config.toml`. Every field can be
/// overridden on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcwConfig {
    /// QRS port on the target server.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of concurrent workers draining the job queue.
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Timeout for a single REST request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Directory holding `client.pem`, `client_key.pem` and optionally `root.pem`.
    #[serde(default)]
    pub cert_dir: Option<PathBuf>,
    /// Suffix appended to the upper-cased user name for `UserPrincipleName`.
    #[serde(default)]
    pub upn_suffix: Option<String>,
    /// Also issue the paged app listing per user.
    #[serde(default)]
    pub extended: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_threads() -> usize {
    DEFAULT_THREADS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for QcwConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            threads: DEFAULT_THREADS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cert_dir: None,
            upn_suffix: None,
            extended: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("qcw")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<QcwConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = QcwConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: QcwConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = QcwConfig::default();
        assert_eq!(cfg.port, 4242);
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.request_timeout_secs, 60);
        assert!(cfg.cert_dir.is_none());
        assert!(!cfg.extended);
    }

    #[test]
    fn config_toml_partial_file_uses_defaults() {
        let cfg: QcwConfig = toml::from_str("threads = 12\n").unwrap();
        assert_eq!(cfg.threads, 12);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.upn_suffix.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            port = 4243
            threads = 8
            request_timeout_secs = 10
            cert_dir = "/etc/qcw/certs"
            upn_suffix = "@corp.local"
            extended = true
        "#;
        let cfg: QcwConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.port, 4243);
        assert_eq!(cfg.threads, 8);
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.cert_dir, Some(PathBuf::from("/etc/qcw/certs")));
        assert_eq!(cfg.upn_suffix.as_deref(), Some("@corp.local"));
        assert!(cfg.extended);
    }
}
