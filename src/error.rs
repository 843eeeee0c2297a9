//! Error types of the storage layer.
//!
//! Transport failures are [`KvError`]; everything the slug store can report
//! is a [`StoreError`]. HTTP handlers never render these directly: the
//! redirect path maps every failure to a `404` with `Cache-Control: no-store`.

use thiserror::Error;

use crate::infrastructure::kv::KvError;

/// Errors returned by [`crate::domain::repositories::SlugRepository`].
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Kv(#[from] KvError),

    #[error("slug not found: {0}")]
    SlugNotFound(String),

    #[error("slug already exists: {0}")]
    SlugExists(String),

    #[error("destination {destination_id} not found on slug {slug}")]
    DestinationNotFound {
        slug: String,
        destination_id: String,
    },

    #[error("invalid record: {0}")]
    Invalid(String),
}
