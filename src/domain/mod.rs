//! Domain layer containing business entities and logic.
//!
//! This module implements the core domain logic following Clean Architecture principles.
//! It defines entities, the storage interface and the metrics pipeline,
//! independent of any particular KV backend.
//!
//! # Architecture
//!
//! - [`entities`] - Slug, destination and resolution data structures
//! - [`repositories`] - Storage trait definitions
//! - [`click_classifier`] - Prefetch, bot and dedupe classification of hits
//! - [`metrics_job`] - Background metrics work items
//! - [`metrics_queue`] - Bounded drop-oldest job queue
//! - [`metrics_worker`] - Workers applying jobs to storage
//!
//! # Metrics Flow
//!
//! 1. The redirect handler resolves the slug and writes the response
//! 2. [`metrics_job::MetricsJob`]s are pushed to the [`metrics_queue::MetricsQueue`] (never blocks)
//! 3. [`metrics_worker::run_metrics_worker`] claims dedupe and increments counters
//! 4. Failures are counted and discarded

pub mod click_classifier;
pub mod entities;
pub mod metrics_job;
pub mod metrics_queue;
pub mod metrics_worker;
pub mod repositories;
