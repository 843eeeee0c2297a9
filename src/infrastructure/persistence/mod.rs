//! KV-backed repository implementations.
//!
//! # Components
//!
//! - [`KeySpace`] - Prefixed key namespace
//! - [`record_codec`] - Versioned record encoding with back-compat decoding
//! - [`KvSlugRepository`] - [`crate::domain::repositories::SlugRepository`] over any transport

pub mod keys;
pub mod kv_slug_repository;
pub mod record_codec;

pub use keys::{DEFAULT_KEY_PREFIX, KeySpace};
pub use kv_slug_repository::KvSlugRepository;
