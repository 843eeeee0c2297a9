//! Query parameters of the fallback page.

use serde::Deserialize;

/// `?slug=...&reason=...` as set by the redirect handler.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FallbackQuery {
    pub slug: String,
    pub reason: String,
}
