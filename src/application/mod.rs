//! Application layer services implementing the redirect use case.
//!
//! This layer orchestrates domain operations by coordinating repository calls
//! and the metrics pipeline. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Slug resolution and round-robin selection
//! - [`services::metrics_scheduler::MetricsScheduler`] - Fire-and-forget click metrics

pub mod services;
