//! Fixed-size worker pool draining a shared `JobQueue`.
//!
//! Launches exactly `workers` tasks on a `JoinSet`. Each worker pops a job,
//! awaits it to completion, then pops the next; an empty queue or a raised
//! cancel flag ends the worker. The pool finishes when every worker has.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::progress::ProgressCounters;
use super::queue::JobQueue;

/// Cooperative cancellation shared by all workers. Checked before each dequeue;
/// a job already running is not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Zero workers would leave the queue undrained forever.
    #[error("worker pool needs at least one worker")]
    NoWorkers,

    #[error("worker task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolSummary {
    /// Workers that actually began running, counted by the workers themselves.
    pub workers_started: usize,
    pub jobs_run: usize,
}

/// Drains `queue` with `workers` concurrent workers, calling `handler` once per job.
///
/// `handler` owns its error handling: the pool only sees `()` so one failed
/// job never stops a worker.
pub async fn run_workers<J, F, Fut>(
    queue: Arc<JobQueue<J>>,
    workers: usize,
    counters: Arc<ProgressCounters>,
    cancel: CancelFlag,
    handler: F,
) -> Result<PoolSummary, PoolError>
where
    J: Send + 'static,
    F: Fn(J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    if workers == 0 {
        return Err(PoolError::NoWorkers);
    }

    let handler = Arc::new(handler);
    let started = Arc::new(AtomicUsize::new(0));
    let mut join_set = tokio::task::JoinSet::new();

    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let counters = Arc::clone(&counters);
        let cancel = cancel.clone();
        let handler = Arc::clone(&handler);
        let started = Arc::clone(&started);
        join_set.spawn(async move {
            started.fetch_add(1, Ordering::Relaxed);
            counters.worker_started();
            let mut ran = 0usize;
            while !cancel.is_cancelled() {
                let Some(job) = queue.try_pop() else {
                    break;
                };
                handler(job).await;
                ran += 1;
            }
            counters.worker_finished();
            tracing::debug!(worker_id, jobs = ran, "worker finished");
            ran
        });
    }

    let mut jobs_run = 0usize;
    while let Some(res) = join_set.join_next().await {
        jobs_run += res?;
    }
    Ok(PoolSummary {
        workers_started: started.load(Ordering::Relaxed),
        jobs_run,
    })
}
