//! Background workers that apply queued metrics jobs to storage.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::domain::metrics_job::{DedupeClaim, MetricsJob};
use crate::domain::metrics_queue::MetricsQueue;
use crate::domain::repositories::SlugRepository;

/// Processes jobs until the queue is closed and drained.
pub async fn run_metrics_worker(queue: Arc<MetricsQueue>, repo: Arc<dyn SlugRepository>) {
    while let Some(job) = queue.pop().await {
        process_job(repo.as_ref(), job).await;
    }
}

/// Spawns `concurrency` workers over one queue.
pub fn spawn_metrics_workers(
    queue: Arc<MetricsQueue>,
    repo: Arc<dyn SlugRepository>,
    concurrency: usize,
) -> Vec<JoinHandle<()>> {
    (0..concurrency.max(1))
        .map(|_| tokio::spawn(run_metrics_worker(queue.clone(), repo.clone())))
        .collect()
}

/// Applies one job. Every storage error is logged, counted and discarded.
pub async fn process_job(repo: &dyn SlugRepository, job: MetricsJob) {
    let name = job.name();
    let result = match &job {
        MetricsJob::RawHit { slug } => repo.record_raw_hit(slug).await,
        MetricsJob::ValidClick {
            slug,
            destination_id,
            dedupe,
        } => {
            if let Some(claim) = dedupe
                && !first_in_window(repo, slug, claim).await
            {
                tracing::debug!(slug = %slug, "Duplicate click inside dedupe window");
                return;
            }
            repo.record_valid_click(slug, destination_id).await
        }
    };

    if let Err(e) = result {
        metrics::counter!("metrics_jobs_failed_total", "job" => name).increment(1);
        tracing::warn!(job = name, slug = job.slug(), error = %e, "Metrics job failed");
    }
}

/// Takes the dedupe claim; a failing claim counts as first in window.
async fn first_in_window(repo: &dyn SlugRepository, slug: &str, claim: &DedupeClaim) -> bool {
    match repo
        .acquire_valid_click_dedupe(slug, &claim.fingerprint, claim.window_seconds)
        .await
    {
        Ok(first) => first,
        Err(e) => {
            tracing::debug!(slug = %slug, error = %e, "Dedupe claim failed, counting click");
            true
        }
    }
}
