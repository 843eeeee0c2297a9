//! Key namespace of the slug store.

/// Prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "lr";

/// Builds every key the store touches, under one configurable prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeySpace {
    /// Creates a key space; a blank prefix falls back to [`DEFAULT_KEY_PREFIX`].
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim();
        let prefix = if prefix.is_empty() {
            DEFAULT_KEY_PREFIX
        } else {
            prefix
        };
        Self {
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn link(&self, slug: &str) -> String {
        format!("{}:link:{slug}", self.prefix)
    }

    /// Aggregate valid-click counter.
    pub fn clicks(&self, slug: &str) -> String {
        format!("{}:clicks:{slug}", self.prefix)
    }

    pub fn destination_clicks(&self, slug: &str, destination_id: &str) -> String {
        format!("{}:destClicks:{slug}:{destination_id}", self.prefix)
    }

    pub fn round_robin(&self, slug: &str) -> String {
        format!("{}:rr:{slug}", self.prefix)
    }

    pub fn raw_hits(&self, slug: &str) -> String {
        format!("{}:hits:{slug}", self.prefix)
    }

    /// Set of every slug.
    pub fn index(&self) -> String {
        format!("{}:links:index", self.prefix)
    }

    pub fn dedupe(&self, slug: &str, fingerprint: &str) -> String {
        format!("{}:dedupe:{slug}:{fingerprint}", self.prefix)
    }

    pub fn fallback_html(&self) -> String {
        format!("{}:fallback:html", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed() {
        let keys = KeySpace::new("tenant1");
        assert_eq!(keys.link("docs"), "tenant1:link:docs");
        assert_eq!(keys.clicks("docs"), "tenant1:clicks:docs");
        assert_eq!(keys.destination_clicks("docs", "d_1"), "tenant1:destClicks:docs:d_1");
        assert_eq!(keys.round_robin("docs"), "tenant1:rr:docs");
        assert_eq!(keys.raw_hits("docs"), "tenant1:hits:docs");
        assert_eq!(keys.index(), "tenant1:links:index");
        assert_eq!(keys.dedupe("docs", "abc"), "tenant1:dedupe:docs:abc");
        assert_eq!(keys.fallback_html(), "tenant1:fallback:html");
    }

    #[test]
    fn test_blank_prefix_uses_default() {
        assert_eq!(KeySpace::new("  ").prefix(), DEFAULT_KEY_PREFIX);
        assert_eq!(KeySpace::default().link("x"), "lr:link:x");
    }
}
