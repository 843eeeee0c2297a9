//! Repository trait for slug storage.

use crate::domain::entities::{
    DestinationEdit, NewDestination, NewSlug, RedirectConfig, SlugDetails, SlugRecord,
    SlugSummary,
};
use crate::error::StoreError;
use async_trait::async_trait;

/// Storage interface for slugs, destinations and their counters.
///
/// The first group of methods is the redirect hot path and only touches the
/// narrowed [`RedirectConfig`] plus atomic counters. The rest are the
/// storage operations behind the admin console.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::KvSlugRepository`] - any
///   [`crate::infrastructure::kv::KvTransport`] (memory, HTTP, Redis)
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlugRepository: Send + Sync {
    /// Loads the enablement and destination slots of a slug.
    ///
    /// Returns `Ok(None)` if no record exists or the stored record matches
    /// no known shape.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Kv`] on transport failures.
    async fn get_redirect_config(&self, slug: &str) -> Result<Option<RedirectConfig>, StoreError>;

    /// Consumes one round-robin step and returns the cursor value to select with.
    ///
    /// The first call for a slug returns `0`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Kv`] on transport failures. The increment is
    /// issued once and never retried.
    async fn next_round_robin_cursor(&self, slug: &str) -> Result<u64, StoreError>;

    /// Increments the raw-hit counter.
    async fn record_raw_hit(&self, slug: &str) -> Result<(), StoreError>;

    /// Increments the aggregate and per-destination valid-click counters in
    /// one round trip.
    async fn record_valid_click(&self, slug: &str, destination_id: &str) -> Result<(), StoreError>;

    /// Claims the dedupe marker for `(slug, fingerprint)`.
    ///
    /// Returns `true` only to the first caller within `window_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Kv`] on transport failures. Callers treat an
    /// error as a successful claim.
    async fn acquire_valid_click_dedupe(
        &self,
        slug: &str,
        fingerprint: &str,
        window_seconds: u64,
    ) -> Result<bool, StoreError>;

    /// Loads the full record of a slug.
    async fn get_slug(&self, slug: &str) -> Result<Option<SlugRecord>, StoreError>;

    /// Creates a slug with one enabled destination and zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SlugExists`] if the slug is taken and
    /// [`StoreError::Invalid`] if the slug or URLs are malformed.
    async fn create_slug(&self, input: NewSlug) -> Result<SlugRecord, StoreError>;

    /// Deletes a slug with its counters and cursor.
    ///
    /// Deleting a missing slug is not an error.
    async fn delete_slug(&self, slug: &str) -> Result<(), StoreError>;

    /// Lists all indexed slugs sorted by slug.
    ///
    /// Index members whose record is missing or undecodable are skipped.
    async fn list_slugs(&self) -> Result<Vec<SlugSummary>, StoreError>;

    /// Loads a slug with all counters.
    async fn get_slug_details(&self, slug: &str) -> Result<Option<SlugDetails>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::SlugNotFound`] if the slug does not exist.
    async fn set_slug_enabled(&self, slug: &str, enabled: bool) -> Result<SlugRecord, StoreError>;

    /// Appends an enabled destination at the end of the rotation.
    async fn add_destination(&self, input: NewDestination) -> Result<SlugRecord, StoreError>;

    /// Replaces the name and URLs of a destination, keeping its id.
    async fn edit_destination(&self, input: DestinationEdit) -> Result<SlugRecord, StoreError>;

    async fn set_destination_enabled(
        &self,
        slug: &str,
        destination_id: &str,
        enabled: bool,
    ) -> Result<SlugRecord, StoreError>;

    /// Removes a destination and its click counter.
    async fn delete_destination(
        &self,
        slug: &str,
        destination_id: &str,
    ) -> Result<SlugRecord, StoreError>;

    /// Zeroes the aggregate, raw-hit and every per-destination counter.
    async fn reset_slug_click_count(&self, slug: &str) -> Result<(), StoreError>;

    async fn reset_destination_click_count(
        &self,
        slug: &str,
        destination_id: &str,
    ) -> Result<(), StoreError>;

    /// Returns the stored fallback page, if any.
    async fn get_fallback_html(&self) -> Result<Option<String>, StoreError>;

    async fn set_fallback_html(&self, html: &str) -> Result<(), StoreError>;

    /// Returns true if the backing store answers.
    async fn ping(&self) -> bool;
}
