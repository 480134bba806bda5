//! Unbounded multi-producer, multi-consumer FIFO with non-blocking pop.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct JobQueue<J> {
    jobs: Mutex<VecDeque<J>>,
}

impl<J> Default for JobQueue<J> {
    fn default() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
        }
    }
}

impl<J> JobQueue<J> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a job. Never blocks, never fails.
    pub fn push(&self, job: J) {
        self.lock().push_back(job);
    }

    /// Takes the oldest job, or `None` if the queue is empty right now.
    pub fn try_pop(&self) -> Option<J> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<J>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<J> FromIterator<J> for JobQueue<J> {
    fn from_iter<I: IntoIterator<Item = J>>(iter: I) -> Self {
        Self {
            jobs: Mutex::new(iter.into_iter().collect()),
        }
    }
}
