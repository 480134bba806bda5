//! Resolution of file defaults and command-line overrides into the
//! immutable settings used for a run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{ConfigError, QcwConfig};
use crate::certs::CertBundle;

/// Server-related values as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    /// Target server, e.g. `https://qlik.corp.local`. A bare host name gets `https://`.
    pub url: String,
    pub port: Option<u16>,
    pub cert_dir: Option<PathBuf>,
    pub insecure: bool,
    pub request_timeout_secs: Option<u64>,
}

/// Everything the `warm` command accepts on the command line.
#[derive(Debug, Clone, Default)]
pub struct WarmOverrides {
    pub server: ServerOverrides,
    pub threads: Option<usize>,
    pub upn_suffix: Option<String>,
    pub clear_cache: bool,
    pub users_file: PathBuf,
    /// `Some` forces the app table request on or off; `None` keeps the file value.
    pub extended: Option<bool>,
    pub deadline_secs: Option<u64>,
}

/// Where and how to reach the QRS.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Scheme, host and port; request paths are joined onto it.
    pub base_url: Url,
    /// Client certificate bundle shared read-only by every connection.
    pub certs: Option<Arc<CertBundle>>,
    /// Skip server certificate verification.
    pub insecure: bool,
    pub request_timeout: Duration,
}

/// Immutable snapshot for one cache-warming run.
#[derive(Debug, Clone)]
pub struct WarmSettings {
    pub server: ServerSettings,
    pub threads: usize,
    pub upn_suffix: Option<String>,
    pub clear_cache: bool,
    pub users_file: PathBuf,
    /// Also issue the paged app table request per user.
    pub extended: bool,
    /// Stop dequeuing new jobs after this long.
    pub deadline: Option<Duration>,
}

impl ServerSettings {
    /// Plain settings for a server without client certificates.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            certs: None,
            insecure: false,
            request_timeout: Duration::from_secs(super::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Port precedence: `--port`, then a port written in the URL, then the
    /// config file (default 4242).
    pub fn resolve(cfg: &QcwConfig, overrides: &ServerOverrides) -> Result<Self, ConfigError> {
        let mut base_url = parse_server_url(&overrides.url)?;

        let port = match overrides.port {
            Some(port) => Some(port),
            None if has_explicit_port(&overrides.url) => None,
            None => Some(cfg.port),
        };
        match port {
            Some(0) => return Err(ConfigError::InvalidPort),
            Some(port) => base_url
                .set_port(Some(port))
                .map_err(|_| ConfigError::InvalidPort)?,
            None if base_url.port() == Some(0) => return Err(ConfigError::InvalidPort),
            None => {}
        }

        let certs = match overrides.cert_dir.as_ref().or(cfg.cert_dir.as_ref()) {
            Some(dir) => Some(Arc::new(CertBundle::load(dir)?)),
            None => None,
        };

        let timeout_secs = overrides
            .request_timeout_secs
            .unwrap_or(cfg.request_timeout_secs)
            .max(1);

        Ok(Self {
            base_url,
            certs,
            insecure: overrides.insecure,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl WarmSettings {
    pub fn resolve(cfg: &QcwConfig, overrides: &WarmOverrides) -> Result<Self, ConfigError> {
        let server = ServerSettings::resolve(cfg, &overrides.server)?;

        let threads = overrides.threads.unwrap_or(cfg.threads);
        if threads == 0 {
            return Err(ConfigError::NoWorkers);
        }

        if !overrides.users_file.is_file() {
            return Err(ConfigError::MissingUserFile(overrides.users_file.clone()));
        }

        let upn_suffix = overrides
            .upn_suffix
            .clone()
            .or_else(|| cfg.upn_suffix.clone())
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            server,
            threads,
            upn_suffix,
            clear_cache: overrides.clear_cache,
            users_file: overrides.users_file.clone(),
            extended: overrides.extended.unwrap_or(cfg.extended),
            deadline: overrides
                .deadline_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
        })
    }
}

fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    let url = Url::parse(&candidate).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

/// True when the authority of `raw` carries a `:port`. `Url` drops a port
/// equal to the scheme default, so this looks at the text as typed.
fn has_explicit_port(raw: &str) -> bool {
    let raw = raw.trim();
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    after_host
        .split_once(':')
        .map_or(false, |(_, port)| !port.is_empty())
}
