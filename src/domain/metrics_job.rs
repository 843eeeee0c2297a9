//! Metrics work handed off by the redirect path.

/// A dedupe claim to take before counting a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeClaim {
    pub fingerprint: String,
    pub window_seconds: u64,
}

/// One unit of background metrics work.
///
/// Jobs carry everything the worker needs so that nothing from the request
/// outlives the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsJob {
    /// Count a resolved hit, redirect or fallback.
    RawHit { slug: String },
    /// Count a valid click, optionally gated by a dedupe claim.
    ValidClick {
        slug: String,
        destination_id: String,
        dedupe: Option<DedupeClaim>,
    },
}

impl MetricsJob {
    /// Label used in logs and the failure counter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RawHit { .. } => "raw_hit",
            Self::ValidClick { .. } => "valid_click",
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::RawHit { slug } | Self::ValidClick { slug, .. } => slug,
        }
    }
}
