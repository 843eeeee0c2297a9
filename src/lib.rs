//! # Link Rotator
//!
//! A short-link redirector that rotates each slug across several
//! destinations and counts clicks without letting bots or prefetchers skew
//! the numbers.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Slug records, click classification, metrics jobs
//! - **Application Layer** ([`application`]) - Redirect resolution and metrics scheduling
//! - **Infrastructure Layer** ([`infrastructure`]) - KV transports and the slug store
//! - **API Layer** ([`api`]) - Redirect, fallback and health handlers
//!
//! ## Features
//!
//! - Round-robin rotation over every URL of every enabled destination
//! - Fallback page for disabled slugs
//! - Prefetch and bot filtering before the cursor moves
//! - Asynchronous raw-hit and valid-click counters with short-window dedupe
//! - In-memory, HTTP or Redis key-value backends
//!
//! ## Quick Start
//!
//! ```bash
//! # Optional: without these the in-memory store is used
//! export KV_REST_URL="https://kv.example.com"
//! export KV_REST_TOKEN="..."
//!
//! # Start the service
//! cargo run
//!
//! # Inspect slugs
//! cargo run --bin admin -- slugs list
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::StoreError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{MetricsScheduler, RedirectService};
    pub use crate::domain::entities::{
        DestinationRecord, FallbackReason, NewDestination, NewSlug, Resolution, SlugRecord,
    };
    pub use crate::domain::metrics_queue::MetricsQueue;
    pub use crate::domain::repositories::SlugRepository;
    pub use crate::error::StoreError;
    pub use crate::infrastructure::kv::{KvTransport, MemoryKv};
    pub use crate::infrastructure::persistence::{KeySpace, KvSlugRepository};
    pub use crate::state::AppState;
}
