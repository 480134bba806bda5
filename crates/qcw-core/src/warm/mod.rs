//! Cache-warming batch: probe, load users, one job per user, drain with the
//! worker pool.
//!
//! A failing user is logged, counted and reported; the worker moves on to
//! the next job.

mod event;
mod probe;
mod task;

use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::{ServerSettings, WarmSettings};
use crate::qrs::app_table_body;
use crate::scheduler::{self, CancelFlag, JobQueue, ProgressCounters};
use crate::users::{self, UserIdentity};

pub use event::ProgressEvent;
pub use probe::{probe_server, ProbeReport};
pub use task::{warm_user, WarmOutcome};

/// State shared read-only by every job of a batch (plus the atomic counters).
pub struct WarmContext {
    pub server: ServerSettings,
    pub upn_suffix: Option<String>,
    /// Body for the app table request; `None` skips it.
    pub table_body: Option<Vec<u8>>,
    pub counters: Arc<ProgressCounters>,
    events: Option<mpsc::Sender<ProgressEvent>>,
}

impl WarmContext {
    pub fn new(
        settings: &WarmSettings,
        events: Option<mpsc::Sender<ProgressEvent>>,
    ) -> Result<Self> {
        let table_body = if settings.extended {
            Some(app_table_body().context("encode app table request")?)
        } else {
            None
        };
        Ok(Self {
            server: settings.server.clone(),
            upn_suffix: settings.upn_suffix.clone(),
            table_body,
            counters: Arc::new(ProgressCounters::new()),
            events,
        })
    }

    async fn emit(&self, event: ProgressEvent) {
        emit(&self.events, event).await;
    }
}

async fn emit(events: &Option<mpsc::Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}

/// One unit of work: warm the cache for one user.
pub struct WarmJob {
    pub identity: UserIdentity,
    pub ctx: Arc<WarmContext>,
}

impl WarmJob {
    pub async fn run(self) {
        let started = Instant::now();
        let ctx = &self.ctx;
        let result = warm_user(
            &ctx.server,
            &self.identity,
            ctx.upn_suffix.as_deref(),
            ctx.table_body.as_deref(),
        )
        .await;
        let elapsed = started.elapsed();

        match result {
            Ok(outcome) => {
                ctx.counters.record_success();
                tracing::debug!(
                    user = %self.identity,
                    apps = outcome.app_count,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "cache warmed"
                );
                ctx.emit(ProgressEvent::UserWarmed {
                    counters: ctx.counters.snapshot(),
                    user: self.identity,
                    app_count: outcome.app_count,
                    listed: outcome.listed,
                    elapsed,
                })
                .await;
            }
            Err(err) => {
                ctx.counters.record_failure();
                tracing::warn!(user = %self.identity, error = %err, "cache warm failed");
                ctx.emit(ProgressEvent::UserFailed {
                    counters: ctx.counters.snapshot(),
                    user: self.identity,
                    error: err.to_string(),
                    elapsed,
                })
                .await;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Jobs enqueued.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Jobs left in the queue when the deadline stopped the workers.
    pub skipped: usize,
    pub workers_started: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Warmed {} of {} users ({} failed, {} skipped) with {} workers in {:.2}s",
            self.succeeded,
            self.total,
            self.failed,
            self.skipped,
            self.workers_started,
            self.elapsed.as_secs_f64()
        )?;
        if self.cancelled {
            write!(f, " (deadline reached)")?;
        }
        Ok(())
    }
}

/// Raises the cancel flag once `deadline` elapses. Dropping the timer aborts
/// it, whichever way the batch ends.
struct DeadlineTimer(tokio::task::JoinHandle<()>);

impl DeadlineTimer {
    fn start(deadline: Duration, cancel: CancelFlag) -> Self {
        Self(tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            tracing::warn!(deadline_secs = deadline.as_secs(), "batch deadline reached; stopping workers");
            cancel.cancel();
        }))
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Enqueues one job per identity and drains the queue with `settings.threads` workers.
pub async fn run_batch(
    settings: &WarmSettings,
    identities: Vec<UserIdentity>,
    events: Option<mpsc::Sender<ProgressEvent>>,
) -> Result<BatchReport> {
    let started = Instant::now();
    let ctx = Arc::new(WarmContext::new(settings, events)?);
    let counters = Arc::clone(&ctx.counters);

    let total = identities.len();
    let queue: Arc<JobQueue<WarmJob>> = Arc::new(
        identities
            .into_iter()
            .map(|identity| WarmJob {
                identity,
                ctx: Arc::clone(&ctx),
            })
            .collect(),
    );
    counters.add_queued(total);
    ctx.emit(ProgressEvent::Started {
        counters: counters.snapshot(),
        workers: settings.threads,
    })
    .await;

    let cancel = CancelFlag::new();
    let _deadline = settings
        .deadline
        .map(|deadline| DeadlineTimer::start(deadline, cancel.clone()));

    let summary = scheduler::run_workers(
        Arc::clone(&queue),
        settings.threads,
        Arc::clone(&counters),
        cancel.clone(),
        |job: WarmJob| job.run(),
    )
    .await?;

    let snapshot = counters.snapshot();
    let report = BatchReport {
        total,
        succeeded: snapshot.completed.saturating_sub(snapshot.failed),
        failed: snapshot.failed,
        skipped: queue.len(),
        workers_started: summary.workers_started,
        cancelled: cancel.is_cancelled(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "batch finished"
    );
    Ok(report)
}

/// Outcome of a full `warm` run.
#[derive(Debug, Clone)]
pub struct WarmReport {
    pub probe: ProbeReport,
    pub rejected_lines: usize,
    pub batch: BatchReport,
}

/// Full startup sequence: probe (fatal on failure), load users, run the batch.
pub async fn run(
    settings: &WarmSettings,
    events: Option<mpsc::Sender<ProgressEvent>>,
) -> Result<WarmReport> {
    let probe = probe_server(&settings.server, settings.clear_cache).await?;
    emit(&events, ProgressEvent::Probed(probe.clone())).await;

    let users = users::load_users(&settings.users_file)?;
    let rejected_lines = users.rejected.len();
    emit(
        &events,
        ProgressEvent::UsersLoaded {
            accepted: users.identities.len(),
            rejected: users.rejected,
        },
    )
    .await;

    let batch = run_batch(settings, users.identities, events).await?;
    Ok(WarmReport {
        probe,
        rejected_lines,
        batch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line_mentions_deadline_only_when_cancelled() {
        let mut r = BatchReport {
            total: 10,
            succeeded: 9,
            failed: 1,
            skipped: 0,
            workers_started: 4,
            cancelled: false,
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            r.to_string(),
            "Warmed 9 of 10 users (1 failed, 0 skipped) with 4 workers in 1.50s"
        );
        r.cancelled = true;
        assert!(r.to_string().ends_with("(deadline reached)"));
    }

    #[tokio::test]
    async fn dropped_deadline_timer_never_fires() {
        let cancel = CancelFlag::new();
        let timer = DeadlineTimer::start(Duration::from_millis(20), cancel.clone());
        drop(timer);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn deadline_timer_raises_the_flag() {
        let cancel = CancelFlag::new();
        let _timer = DeadlineTimer::start(Duration::from_millis(10), cancel.clone());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cancel.is_cancelled());
    }
}
