#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use link_rotator::application::services::MetricsScheduler;
use link_rotator::domain::entities::{NewDestination, NewSlug, SlugRecord};
use link_rotator::domain::metrics_queue::MetricsQueue;
use link_rotator::domain::metrics_worker::process_job;
use link_rotator::domain::repositories::SlugRepository;
use link_rotator::infrastructure::kv::MemoryKv;
use link_rotator::infrastructure::persistence::{KeySpace, KvSlugRepository};
use link_rotator::routes::router;
use link_rotator::state::AppState;
use std::sync::Arc;

pub type MemoryRepo = KvSlugRepository<MemoryKv>;

pub const CHROME_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/537.36 Chrome/121.0 Safari/537.36";
pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<MemoryRepo>,
    pub queue: Arc<MetricsQueue>,
}

impl TestApp {
    /// Applies every queued metrics job, as the workers would.
    pub async fn drain_metrics(&self) {
        while !self.queue.is_empty() {
            let Some(job) = self.queue.pop().await else {
                break;
            };
            process_job(self.repo.as_ref(), job).await;
        }
    }
}

pub fn memory_repo() -> Arc<MemoryRepo> {
    Arc::new(KvSlugRepository::new(
        Arc::new(MemoryKv::new()),
        KeySpace::default(),
    ))
}

pub fn create_test_state(dedupe_window_seconds: u64) -> (AppState, Arc<MemoryRepo>, Arc<MetricsQueue>) {
    let repo = memory_repo();
    let queue = Arc::new(MetricsQueue::new(1_000));
    let scheduler = MetricsScheduler::new(queue.clone(), dedupe_window_seconds);
    let repository: Arc<dyn SlugRepository> = repo.clone();
    let state = AppState::new(repository, scheduler, "/fallback");
    (state, repo, queue)
}

pub fn create_test_app(dedupe_window_seconds: u64) -> TestApp {
    let (state, repo, queue) = create_test_state(dedupe_window_seconds);
    let server = TestServer::new(router(state)).unwrap();
    TestApp {
        server,
        repo,
        queue,
    }
}

pub async fn create_test_slug(repo: &MemoryRepo, slug: &str, urls: &[&str]) -> SlugRecord {
    repo.create_slug(NewSlug {
        slug: slug.to_string(),
        destination_name: "primary".to_string(),
        destination_urls: urls.iter().map(|u| u.to_string()).collect(),
    })
    .await
    .unwrap()
}

pub async fn add_test_destination(
    repo: &MemoryRepo,
    slug: &str,
    name: &str,
    urls: &[&str],
) -> SlugRecord {
    repo.add_destination(NewDestination {
        slug: slug.to_string(),
        name: name.to_string(),
        urls: urls.iter().map(|u| u.to_string()).collect(),
    })
    .await
    .unwrap()
}

/// Headers of a user-activated top-level browser navigation.
pub fn navigation_headers() -> Vec<(HeaderName, HeaderValue)> {
    [
        ("user-agent", CHROME_UA),
        ("accept", HTML_ACCEPT),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-user", "?1"),
        ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
    ]
    .into_iter()
    .map(|(k, v)| (HeaderName::from_static(k), HeaderValue::from_static(v)))
    .collect()
}
