//! Shared progress counters for a cache-warming batch.
//!
//! Each field is an independent atomic; a snapshot is a best-effort view and
//! may be slightly out of step under concurrency. Decrements saturate at 0 in
//! release builds; an unmatched decrement is a bug and trips a debug assertion.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct ProgressCounters {
    queued: AtomicUsize,
    active_workers: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Jobs not yet finished.
    pub queued: usize,
    pub active_workers: usize,
    /// Jobs finished, successfully or not.
    pub completed: usize,
    /// Subset of `completed` that failed.
    pub failed: usize,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_queued(&self, n: usize) {
        self.queued.fetch_add(n, Ordering::Relaxed);
    }

    pub fn worker_started(&self) {
        self.active_workers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_finished(&self) {
        saturating_dec(&self.active_workers);
    }

    pub fn record_success(&self) {
        saturating_dec(&self.queued);
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        saturating_dec(&self.queued);
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            queued: self.queued.load(Ordering::Relaxed),
            active_workers: self.active_workers.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

fn saturating_dec(counter: &AtomicUsize) {
    let prev = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    debug_assert!(prev.is_ok(), "progress counter decremented below zero");
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "active={} queued={} completed={}",
            self.active_workers, self.queued, self.completed
        )?;
        if self.failed > 0 {
            write!(f, " failed={}", self.failed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failure_keep_total() {
        let c = ProgressCounters::new();
        c.add_queued(3);
        c.record_success();
        c.record_failure();
        let s = c.snapshot();
        assert_eq!(s.queued, 1);
        assert_eq!(s.completed, 2);
        assert_eq!(s.failed, 1);
        assert_eq!(s.queued + s.completed, 3);
    }

    #[test]
    fn every_job_drains_queued_to_zero() {
        let c = ProgressCounters::new();
        c.add_queued(2);
        c.worker_started();
        c.record_success();
        c.record_failure();
        c.worker_finished();
        let s = c.snapshot();
        assert_eq!(s.active_workers, 0);
        assert_eq!(s.queued, 0);
        assert_eq!(s.completed, 2);
        assert_eq!(s.failed, 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "below zero")]
    fn unmatched_completion_trips_debug_assertion() {
        ProgressCounters::new().record_success();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "below zero")]
    fn unmatched_worker_finish_trips_debug_assertion() {
        ProgressCounters::new().worker_finished();
    }

    #[test]
    fn display_shows_failed_only_when_nonzero() {
        let mut s = CounterSnapshot {
            queued: 5,
            active_workers: 2,
            completed: 1,
            failed: 0,
        };
        assert_eq!(s.to_string(), "active=2 queued=5 completed=1");
        s.failed = 1;
        assert_eq!(s.to_string(), "active=2 queued=5 completed=1 failed=1");
    }
}
