//! `qcw warm` – probe, load users, warm every user's cache.

use anyhow::Result;
use qcw_core::config::{QcwConfig, WarmOverrides, WarmSettings};
use qcw_core::warm::{self, ProgressEvent};

pub async fn run_warm(cfg: &QcwConfig, overrides: &WarmOverrides) -> Result<()> {
    let settings = WarmSettings::resolve(cfg, overrides)?;
    tracing::info!(
        server = %settings.server.base_url,
        threads = settings.threads,
        extended = settings.extended,
        users_file = %settings.users_file.display(),
        "starting warm run"
    );

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            println!("{}", event);
        }
    });

    let result = warm::run(&settings, Some(progress_tx)).await;
    let _ = printer.await;

    let report = result?;
    println!("{}", report.batch);
    Ok(())
}
