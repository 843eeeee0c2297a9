//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::{MetricsScheduler, RedirectService};
use crate::domain::repositories::SlugRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn SlugRepository>,
    pub redirect_service: Arc<RedirectService<dyn SlugRepository>>,
    pub metrics: MetricsScheduler,
    /// Path the fallback page is served on, e.g. `/fallback`.
    pub fallback_path: Arc<str>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn SlugRepository>,
        metrics: MetricsScheduler,
        fallback_path: &str,
    ) -> Self {
        Self {
            redirect_service: Arc::new(RedirectService::new(repository.clone())),
            repository,
            metrics,
            fallback_path: Arc::from(fallback_path),
        }
    }
}
