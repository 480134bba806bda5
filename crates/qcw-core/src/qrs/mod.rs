//! QRS (repository service) REST connection.
//!
//! One connection impersonates one identity: every request carries the
//! `X-Qlik-User` header, the connection's xrfkey (header and query
//! parameter) and any custom headers set before the first request. Requests
//! run on libcurl (via the `curl` crate); the async variants move the
//! blocking call onto `spawn_blocking`.

mod error;
mod headers;
mod response;
mod table;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::ServerSettings;
use crate::users::UserIdentity;

pub use error::QrsError;
pub use headers::{
    new_xrfkey, security_header, user_header, SECURITY_HEADER, USER_HEADER, XRFKEY_HEADER,
    XRFKEY_LEN,
};
pub use response::{About, Count, QrsResponse, Table};
pub use table::{app_table_body, app_table_request, TableColumn, TableRequest, APP_TABLE_PATH};

pub const ABOUT_PATH: &str = "/qrs/about";
pub const APP_COUNT_PATH: &str = "/qrs/app/count";
pub const RESET_CACHE_PATH: &str = "/qrs/systemrule/security/resetcache";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Identity used for the startup probe.
pub fn service_identity() -> UserIdentity {
    UserIdentity::new("INTERNAL", "sa_repository")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

pub struct QrsConnection {
    server: ServerSettings,
    identity: UserIdentity,
    xrfkey: String,
    headers: HashMap<String, String>,
    easy: Mutex<curl::easy::Easy>,
}

impl QrsConnection {
    /// New connection acting as `identity`. No request is made yet.
    pub fn open(server: &ServerSettings, identity: &UserIdentity) -> Self {
        let xrfkey = new_xrfkey();
        let mut headers = HashMap::new();
        headers.insert(XRFKEY_HEADER.to_string(), xrfkey.clone());
        headers.insert(USER_HEADER.to_string(), user_header(identity));
        Self {
            server: server.clone(),
            identity: identity.clone(),
            xrfkey,
            headers,
            easy: Mutex::new(curl::easy::Easy::new()),
        }
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn xrfkey(&self) -> &str {
        &self.xrfkey
    }

    /// Adds or replaces a header sent with every request.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Full request URL: base + path + `xrfkey` query parameter.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.server.base_url.as_str().trim_end_matches('/');
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}xrfkey={}", base, path, sep, self.xrfkey)
    }

    pub fn get(&self, path: &str) -> Result<QrsResponse, QrsError> {
        self.perform(Method::Get, path, None)
    }

    pub fn post(&self, path: &str, body: &[u8]) -> Result<QrsResponse, QrsError> {
        self.perform(Method::Post, path, Some(body))
    }

    pub async fn get_async(self: &Arc<Self>, path: &str) -> Result<QrsResponse, QrsError> {
        let conn = Arc::clone(self);
        let path = path.to_string();
        tokio::task::spawn_blocking(move || conn.get(&path)).await?
    }

    pub async fn post_async(
        self: &Arc<Self>,
        path: &str,
        body: Vec<u8>,
    ) -> Result<QrsResponse, QrsError> {
        let conn = Arc::clone(self);
        let path = path.to_string();
        tokio::task::spawn_blocking(move || conn.post(&path, &body)).await?
    }

    fn perform(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<QrsResponse, QrsError> {
        let url = self.endpoint(path);
        let started = Instant::now();

        // One handle per connection; reset() keeps its live connections.
        let mut easy = self.easy.lock().unwrap_or_else(PoisonError::into_inner);
        easy.reset();
        easy.url(&url)?;
        easy.connect_timeout(CONNECT_TIMEOUT)?;
        easy.timeout(self.server.request_timeout)?;

        if let Some(certs) = &self.server.certs {
            easy.ssl_cert(&certs.client_cert)?;
            easy.ssl_cert_type("PEM")?;
            easy.ssl_key(&certs.client_key)?;
            easy.ssl_key_type("PEM")?;
            if let Some(root) = &certs.root_cert {
                easy.cainfo(root)?;
            }
        }
        if self.server.insecure {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }

        let mut list = curl::easy::List::new();
        for (k, v) in &self.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        list.append("Accept: application/json")?;
        match method {
            Method::Get => easy.get(true)?,
            Method::Post => {
                list.append("Content-Type: application/json")?;
                // Suppress `Expect: 100-continue` for larger bodies.
                list.append("Expect:")?;
                easy.post(true)?;
                easy.post_fields_copy(body.unwrap_or_default())?;
            }
        }
        easy.http_headers(list)?;

        let mut data = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|chunk| {
                data.extend_from_slice(chunk);
                Ok(chunk.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(
            user = %self.identity,
            %method,
            path,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "qrs request"
        );
        if !(200..300).contains(&status) {
            return Err(QrsError::Status {
                method,
                path: path.to_string(),
                status,
            });
        }

        Ok(QrsResponse {
            path: path.to_string(),
            status,
            body: data,
        })
    }
}
