//! Startup probe: confirm the QRS answers as the repository service account
//! before any user is impersonated.

use anyhow::Result;
use std::sync::Arc;

use crate::config::ServerSettings;
use crate::qrs::{
    service_identity, About, Count, QrsConnection, QrsError, ABOUT_PATH, APP_COUNT_PATH,
    RESET_CACHE_PATH,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub build_version: Option<String>,
    pub app_count: u64,
    pub cache_cleared: bool,
}

/// `GET /qrs/about`, `GET /qrs/app/count` and, if asked, one
/// `POST /qrs/systemrule/security/resetcache` with an empty body.
/// Any failure is logged and returned; the caller must not continue.
pub async fn probe_server(server: &ServerSettings, clear_cache: bool) -> Result<ProbeReport> {
    let conn = Arc::new(QrsConnection::open(server, &service_identity()));

    match probe_requests(&conn, clear_cache).await {
        Ok(report) => {
            tracing::info!(
                server = %server.base_url,
                version = report.build_version.as_deref().unwrap_or("unknown"),
                apps = report.app_count,
                cache_cleared = report.cache_cleared,
                "startup probe ok"
            );
            Ok(report)
        }
        Err(err) => {
            tracing::error!(server = %server.base_url, error = %err, "startup probe failed");
            Err(anyhow::Error::new(err).context(format!("probe {}", server.base_url)))
        }
    }
}

async fn probe_requests(
    conn: &Arc<QrsConnection>,
    clear_cache: bool,
) -> Result<ProbeReport, QrsError> {
    let about: About = conn.get_async(ABOUT_PATH).await?.json()?;
    let count: Count = conn.get_async(APP_COUNT_PATH).await?.json()?;
    if clear_cache {
        conn.post_async(RESET_CACHE_PATH, Vec::new()).await?;
    }
    Ok(ProbeReport {
        build_version: about.build_version,
        app_count: count.value,
        cache_cleared: clear_cache,
    })
}
