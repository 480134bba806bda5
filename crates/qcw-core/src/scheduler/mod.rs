//! Job queue and bounded worker pool.
//!
//! All jobs are enqueued up front; a fixed number of workers each loop
//! "try pop, run to completion" and exit when the queue is empty (or the
//! batch is cancelled). Progress is tracked in shared atomic counters.

mod pool;
mod progress;
mod queue;

pub use pool::{run_workers, CancelFlag, PoolError, PoolSummary};
pub use progress::{CounterSnapshot, ProgressCounters};
pub use queue::JobQueue;
