//! `qcw probe` – connectivity check as the repository service account.

use anyhow::Result;
use qcw_core::config::{QcwConfig, ServerOverrides, ServerSettings};
use qcw_core::warm::{self, ProgressEvent};

pub async fn run_probe(cfg: &QcwConfig, overrides: &ServerOverrides, clear_cache: bool) -> Result<()> {
    let server = ServerSettings::resolve(cfg, overrides)?;
    let report = warm::probe_server(&server, clear_cache).await?;
    println!("{}", ProgressEvent::Probed(report));
    Ok(())
}
