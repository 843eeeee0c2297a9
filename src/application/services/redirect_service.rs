//! Slug resolution: the redirect state machine.

use std::sync::Arc;

use crate::domain::entities::{FallbackReason, RedirectConfig, Resolution};
use crate::domain::repositories::SlugRepository;
use crate::utils::slug::parse_slug;
use crate::utils::url_check::is_http_url;

/// Turns a raw slug into a redirect decision.
///
/// The only storage calls are one configuration read and, when `track` is
/// set and more than one slot is enabled, one cursor increment. Storage
/// failures resolve to [`Resolution::NotFound`].
pub struct RedirectService<R: SlugRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: SlugRepository + ?Sized> RedirectService<R> {
    /// Creates a new redirect service.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Resolves a slug from the request path.
    ///
    /// # Arguments
    ///
    /// - `raw_slug` - Slug as it appeared in the path, before normalization
    /// - `track` - Whether this hit may consume a round-robin step
    pub async fn resolve(&self, raw_slug: &str, track: bool) -> Resolution {
        let resolution = self.resolve_inner(raw_slug, track).await;
        metrics::counter!("redirect_resolutions_total", "outcome" => resolution.kind())
            .increment(1);
        resolution
    }

    async fn resolve_inner(&self, raw_slug: &str, track: bool) -> Resolution {
        let Some(slug) = parse_slug(raw_slug) else {
            return Resolution::NotFound;
        };

        let config = match self.repository.get_redirect_config(&slug).await {
            Ok(Some(config)) => config,
            Ok(None) => return Resolution::NotFound,
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "Redirect config unavailable");
                return Resolution::NotFound;
            }
        };

        self.decide(slug, &config, track).await
    }

    async fn decide(&self, slug: String, config: &RedirectConfig, track: bool) -> Resolution {
        if !config.enabled {
            return Resolution::Fallback {
                slug,
                reason: FallbackReason::SlugDisabled,
            };
        }

        let slots = config.enabled_slots();
        if slots.is_empty() {
            return Resolution::Fallback {
                slug,
                reason: FallbackReason::AllDestinationsDisabled,
            };
        }

        let index = if !track || slots.len() == 1 {
            0
        } else {
            match self.repository.next_round_robin_cursor(&slug).await {
                Ok(cursor) => (cursor % slots.len() as u64) as usize,
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "Round-robin cursor unavailable");
                    return Resolution::NotFound;
                }
            }
        };

        let slot = slots[index];
        if !is_http_url(slot.url) {
            tracing::warn!(
                slug = %slug,
                destination_id = slot.destination_id,
                "Stored destination URL is not http(s)"
            );
            return Resolution::NotFound;
        }

        Resolution::Redirect {
            url: slot.url.to_string(),
            destination_id: slot.destination_id.to_string(),
            slug,
        }
    }
}
