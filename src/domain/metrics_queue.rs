//! Bounded drop-oldest queue between request handlers and metrics workers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

use crate::domain::metrics_job::MetricsJob;

#[derive(Debug, Default)]
struct QueueState {
    jobs: VecDeque<MetricsJob>,
    closed: bool,
}

/// A multi-producer, multi-consumer job queue that never blocks producers.
///
/// When full, pushing evicts the oldest queued job. After [`close`] no new
/// jobs are accepted, and consumers drain what is left and then see `None`.
///
/// [`close`]: MetricsQueue::close
#[derive(Debug)]
pub struct MetricsQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
    dropped: AtomicU64,
}

impl MetricsQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues a job without waiting.
    ///
    /// Returns `false` if the queue is closed and the job was discarded.
    pub fn push(&self, job: MetricsJob) -> bool {
        let evicted = {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            let evicted = if state.jobs.len() >= self.capacity {
                state.jobs.pop_front()
            } else {
                None
            };
            state.jobs.push_back(job);
            evicted
        };

        if let Some(old) = evicted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("metrics_jobs_dropped_total").increment(1);
            tracing::debug!(job = old.name(), slug = old.slug(), "Metrics queue full, dropped oldest job");
        }
        self.notify.notify_one();
        true
    }

    /// Waits for the next job.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn pop(&self) -> Option<MetricsJob> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.lock();
                if let Some(job) = state.jobs.pop_front() {
                    return Some(job);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Stops accepting jobs and wakes every waiting consumer.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs evicted because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
