//! The narrowed view of a slug read on the redirect path.

use super::slug::SlugRecord;

/// Enablement and destination slots of one slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfig {
    pub enabled: bool,
    pub destinations: Vec<RedirectDestination>,
}

/// The parts of a destination the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDestination {
    pub id: String,
    pub urls: Vec<String>,
    pub enabled: bool,
}

/// One selectable `(destination, url)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub destination_id: &'a str,
    pub url: &'a str,
}

impl RedirectConfig {
    /// Flattens enabled destinations into slots.
    ///
    /// Order is destination order, then URL order within a destination, so a
    /// cursor value maps to the same slot for a fixed configuration.
    pub fn enabled_slots(&self) -> Vec<Slot<'_>> {
        self.destinations
            .iter()
            .filter(|d| d.enabled)
            .flat_map(|d| {
                d.urls.iter().map(move |url| Slot {
                    destination_id: d.id.as_str(),
                    url: url.as_str(),
                })
            })
            .collect()
    }
}

impl From<&SlugRecord> for RedirectConfig {
    fn from(record: &SlugRecord) -> Self {
        Self {
            enabled: record.enabled,
            destinations: record
                .destinations
                .iter()
                .map(|d| RedirectDestination {
                    id: d.id.clone(),
                    urls: d.urls.clone(),
                    enabled: d.enabled,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(id: &str, urls: &[&str], enabled: bool) -> RedirectDestination {
        RedirectDestination {
            id: id.to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
            enabled,
        }
    }

    #[test]
    fn test_slots_follow_destination_then_url_order() {
        let config = RedirectConfig {
            enabled: true,
            destinations: vec![
                dest("a", &["https://a/1", "https://a/2"], true),
                dest("b", &["https://b/1"], true),
            ],
        };

        let slots = config.enabled_slots();
        let urls: Vec<&str> = slots.iter().map(|s| s.url).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2", "https://b/1"]);
        assert_eq!(slots[2].destination_id, "b");
    }

    #[test]
    fn test_disabled_destinations_contribute_no_slots() {
        let config = RedirectConfig {
            enabled: true,
            destinations: vec![
                dest("a", &["https://a/1", "https://a/2", "https://a/3"], false),
                dest("b", &["https://b/1"], true),
            ],
        };

        let slots = config.enabled_slots();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].destination_id, "b");
    }
}
