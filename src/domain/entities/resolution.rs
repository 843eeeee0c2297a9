//! Outcome of resolving a slug.

use std::fmt;

/// Why a known slug does not redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    SlugDisabled,
    AllDestinationsDisabled,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlugDisabled => "slug_disabled",
            Self::AllDestinationsDisabled => "all_destinations_disabled",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The redirect decision for one request.
///
/// `slug` is the normalized slug; callers use it for metrics keys and the
/// fallback query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Fallback {
        slug: String,
        reason: FallbackReason,
    },
    Redirect {
        slug: String,
        url: String,
        destination_id: String,
    },
}

impl Resolution {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Fallback { .. } => "fallback",
            Self::Redirect { .. } => "redirect",
        }
    }

    /// The normalized slug for hits that matched a record.
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::NotFound => None,
            Self::Fallback { slug, .. } | Self::Redirect { slug, .. } => Some(slug),
        }
    }
}
