//! Progress events sent from workers to the single printer.

use std::fmt;
use std::time::Duration;

use super::ProbeReport;
use crate::scheduler::CounterSnapshot;
use crate::users::{RejectedLine, UserIdentity};

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Startup probe succeeded.
    Probed(ProbeReport),
    /// User file parsed; malformed lines were skipped.
    UsersLoaded {
        accepted: usize,
        rejected: Vec<RejectedLine>,
    },
    /// All jobs enqueued; workers about to start.
    Started {
        counters: CounterSnapshot,
        workers: usize,
    },
    UserWarmed {
        counters: CounterSnapshot,
        user: UserIdentity,
        app_count: u64,
        /// Rows returned by the app table request (extended mode only).
        listed: Option<usize>,
        elapsed: Duration,
    },
    UserFailed {
        counters: CounterSnapshot,
        user: UserIdentity,
        error: String,
        elapsed: Duration,
    },
}

impl ProgressEvent {
    pub fn counters(&self) -> Option<CounterSnapshot> {
        match self {
            ProgressEvent::Started { counters, .. }
            | ProgressEvent::UserWarmed { counters, .. }
            | ProgressEvent::UserFailed { counters, .. } => Some(*counters),
            ProgressEvent::Probed(_) | ProgressEvent::UsersLoaded { .. } => None,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(counters) = self.counters() {
            write!(f, "[{}] ", counters)?;
        }
        match self {
            ProgressEvent::Probed(report) => {
                write!(
                    f,
                    "QRS {} reachable, {} apps visible to the service account",
                    report.build_version.as_deref().unwrap_or("(unknown version)"),
                    report.app_count
                )?;
                if report.cache_cleared {
                    write!(f, "; security rule cache reset")?;
                }
                Ok(())
            }
            ProgressEvent::UsersLoaded { accepted, rejected } => {
                write!(f, "{} users loaded", accepted)?;
                if !rejected.is_empty() {
                    write!(f, ", {} lines skipped:", rejected.len())?;
                    for r in rejected {
                        write!(f, "\n  line {}: {} ({:?})", r.line_no, r.reason, r.content)?;
                    }
                }
                Ok(())
            }
            ProgressEvent::Started { workers, .. } => write!(f, "starting {} workers", workers),
            ProgressEvent::UserWarmed {
                user,
                app_count,
                listed,
                elapsed,
                ..
            } => {
                write!(f, "{} apps={}", user, app_count)?;
                if let Some(n) = listed {
                    write!(f, " listed={}", n)?;
                }
                write!(f, " in {} ms", elapsed.as_millis())
            }
            ProgressEvent::UserFailed {
                user,
                error,
                elapsed,
                ..
            } => write!(f, "{} FAILED after {} ms: {}", user, elapsed.as_millis(), error),
        }
    }
}
