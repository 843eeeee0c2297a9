//! Business logic services for the application layer.

pub mod metrics_scheduler;
pub mod redirect_service;

pub use metrics_scheduler::MetricsScheduler;
pub use redirect_service::RedirectService;
