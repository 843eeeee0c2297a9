//! HTTP server initialization and runtime setup.
//!
//! Handles KV transport selection, metrics worker spawning, and Axum server lifecycle.

use crate::application::services::MetricsScheduler;
use crate::config::{Config, KvBackend};
use crate::domain::metrics_queue::MetricsQueue;
use crate::domain::metrics_worker::spawn_metrics_workers;
use crate::domain::repositories::SlugRepository;
use crate::infrastructure::kv::{HttpKv, MemoryKv, RedisKv};
use crate::infrastructure::persistence::{KeySpace, KvSlugRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How long shutdown waits for metrics workers to drain the queue.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the slug repository over the configured KV backend.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or Redis is unreachable.
pub async fn build_repository(config: &Config) -> Result<Arc<dyn SlugRepository>> {
    let keys = KeySpace::new(&config.kv_prefix);
    let policy = config.retry_policy();

    let repository: Arc<dyn SlugRepository> = match config.kv_backend {
        KvBackend::Memory => {
            tracing::info!("KV backend: in-memory");
            Arc::new(KvSlugRepository::new(Arc::new(MemoryKv::new()), keys))
        }
        KvBackend::Http => {
            let url = config
                .kv_rest_url
                .as_deref()
                .context("KV_REST_URL must be set")?;
            let token = config
                .kv_rest_token
                .as_deref()
                .context("KV_REST_TOKEN must be set")?;
            let kv = HttpKv::new(url, token, policy).context("Failed to build KV HTTP client")?;
            tracing::info!("KV backend: HTTP ({url})");
            Arc::new(KvSlugRepository::new(Arc::new(kv), keys))
        }
        KvBackend::Redis => {
            let url = config.redis_url.as_deref().context("REDIS_URL must be set")?;
            let kv = RedisKv::connect(url, policy)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("KV backend: Redis");
            Arc::new(KvSlugRepository::new(Arc::new(kv), keys))
        }
    };

    Ok(repository)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - KV transport and slug repository
/// - Metrics queue and background workers
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the metrics queue is closed and workers get a bounded
/// window to drain what is left.
///
/// # Errors
///
/// Returns an error if:
/// - The KV backend cannot be initialized
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;

    if !repository.ping().await {
        tracing::warn!("KV backend did not answer ping at startup");
    }

    let queue = Arc::new(MetricsQueue::new(config.metrics_queue_capacity));
    let workers = spawn_metrics_workers(
        queue.clone(),
        repository.clone(),
        config.metrics_worker_concurrency,
    );
    tracing::info!(
        workers = workers.len(),
        capacity = config.metrics_queue_capacity,
        "Metrics workers started"
    );

    let scheduler = MetricsScheduler::new(queue.clone(), config.click_dedupe_window_seconds);
    let state = AppState::new(repository, scheduler, &config.fallback_path);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!(pending = queue.len(), "Server stopped, draining metrics queue");
    queue.close();

    let drain = async {
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "Metrics worker panicked");
            }
        }
    };
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, drain).await.is_err() {
        tracing::warn!(
            pending = queue.len(),
            "Metrics workers did not drain in time, dropping remaining jobs"
        );
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
