//! Fire-and-forget hand-off of metrics work from the redirect path.

use axum::http::HeaderMap;
use std::sync::Arc;

use crate::domain::click_classifier::dedupe_fingerprint;
use crate::domain::metrics_job::{DedupeClaim, MetricsJob};
use crate::domain::metrics_queue::MetricsQueue;

/// Schedules raw-hit and valid-click recording.
///
/// Scheduling only enqueues; it never waits on storage and never fails.
/// Workers in [`crate::domain::metrics_worker`] do the actual writes.
#[derive(Clone)]
pub struct MetricsScheduler {
    queue: Arc<MetricsQueue>,
    dedupe_window_seconds: u64,
}

impl MetricsScheduler {
    /// Creates a scheduler; a zero `dedupe_window_seconds` disables dedupe.
    pub fn new(queue: Arc<MetricsQueue>, dedupe_window_seconds: u64) -> Self {
        Self {
            queue,
            dedupe_window_seconds,
        }
    }

    pub fn queue(&self) -> &Arc<MetricsQueue> {
        &self.queue
    }

    /// Counts a resolved hit regardless of click quality.
    pub fn schedule_raw_hit(&self, slug: &str) {
        self.enqueue(MetricsJob::RawHit {
            slug: slug.to_string(),
        });
    }

    /// Counts a valid click, deduplicated by client fingerprint when possible.
    ///
    /// The fingerprint is taken from `headers` now, so the request does not
    /// have to outlive the response.
    pub fn schedule_valid_click(&self, slug: &str, destination_id: &str, headers: &HeaderMap) {
        let dedupe = if self.dedupe_window_seconds > 0 {
            dedupe_fingerprint(headers).map(|fingerprint| DedupeClaim {
                fingerprint,
                window_seconds: self.dedupe_window_seconds,
            })
        } else {
            None
        };

        self.enqueue(MetricsJob::ValidClick {
            slug: slug.to_string(),
            destination_id: destination_id.to_string(),
            dedupe,
        });
    }

    fn enqueue(&self, job: MetricsJob) {
        let name = job.name();
        if !self.queue.push(job) {
            tracing::debug!(job = name, "Metrics queue closed, job discarded");
        }
    }
}
