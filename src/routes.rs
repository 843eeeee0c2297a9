//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: KV, metrics queue
//! - `GET  /fallback`    - Fallback page (path configurable)
//! - `GET|HEAD /{slug}`  - Slug redirect
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{fallback_handler, health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the routes without path normalization.
///
/// Static routes take precedence over `/{slug}`, so the health and fallback
/// paths are never resolved as slugs.
pub fn router(state: AppState) -> Router {
    let fallback_path = state.fallback_path.to_string();

    Router::new()
        .route("/health", get(health_handler))
        .route(&fallback_path, get(fallback_handler))
        .route("/{slug}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// `GET` routes also answer `HEAD`; the redirect handler sees the real method.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}
