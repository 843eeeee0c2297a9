//! Destination entity: a named group of interchangeable target URLs.

use chrono::{DateTime, Utc};

/// A destination attached to a slug.
///
/// Each URL of the group is one round-robin slot. `id` is generated at
/// creation and never changes; `name` is a display label only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRecord {
    pub id: String,
    pub name: String,
    pub urls: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl DestinationRecord {
    /// Creates an enabled destination.
    pub fn new(id: String, name: String, urls: Vec<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            urls,
            enabled: true,
            created_at,
        }
    }
}

/// Input data for adding a destination to an existing slug.
#[derive(Debug, Clone)]
pub struct NewDestination {
    pub slug: String,
    pub name: String,
    pub urls: Vec<String>,
}

/// Replacement name and URL list for an existing destination.
#[derive(Debug, Clone)]
pub struct DestinationEdit {
    pub slug: String,
    pub destination_id: String,
    pub name: String,
    pub urls: Vec<String>,
}

/// A destination together with its valid-click counter.
#[derive(Debug, Clone)]
pub struct DestinationWithClicks {
    pub destination: DestinationRecord,
    pub click_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_starts_enabled() {
        let now = Utc::now();
        let dest = DestinationRecord::new(
            "d_1".to_string(),
            "Docs".to_string(),
            vec!["https://a.example/1".to_string()],
            now,
        );

        assert!(dest.enabled);
        assert_eq!(dest.id, "d_1");
        assert_eq!(dest.urls.len(), 1);
        assert_eq!(dest.created_at, now);
    }
}
