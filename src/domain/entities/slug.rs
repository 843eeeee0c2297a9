//! Slug entity: the redirect configuration behind one short code.

use chrono::{DateTime, Utc};

use super::destination::{DestinationRecord, DestinationWithClicks};

/// A slug and its ordered destinations.
///
/// Destination order is round-robin order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugRecord {
    pub slug: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub destinations: Vec<DestinationRecord>,
}

impl SlugRecord {
    /// Returns the number of enabled destinations.
    pub fn enabled_destination_count(&self) -> usize {
        self.destinations.iter().filter(|d| d.enabled).count()
    }

    /// Finds a destination by id.
    pub fn destination(&self, id: &str) -> Option<&DestinationRecord> {
        self.destinations.iter().find(|d| d.id == id)
    }
}

/// Input data for creating a slug with its first destination.
#[derive(Debug, Clone)]
pub struct NewSlug {
    pub slug: String,
    pub destination_name: String,
    pub destination_urls: Vec<String>,
}

/// A row of the slug listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugSummary {
    pub slug: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub total_click_count: u64,
    pub raw_hit_count: u64,
    pub destination_count: usize,
    pub enabled_destination_count: usize,
}

/// Full view of one slug with its counters.
#[derive(Debug, Clone)]
pub struct SlugDetails {
    pub slug: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub total_click_count: u64,
    pub raw_hit_count: u64,
    /// Index of the most recently consumed cursor step.
    pub round_robin_cursor: u64,
    pub destinations: Vec<DestinationWithClicks>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(id: &str, enabled: bool) -> DestinationRecord {
        DestinationRecord {
            id: id.to_string(),
            name: id.to_string(),
            urls: vec![format!("https://{id}.example")],
            enabled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_enabled_destination_count() {
        let record = SlugRecord {
            slug: "docs".to_string(),
            enabled: true,
            created_at: Utc::now(),
            destinations: vec![dest("a", true), dest("b", false), dest("c", true)],
        };

        assert_eq!(record.enabled_destination_count(), 2);
        assert_eq!(record.destination("b").map(|d| d.enabled), Some(false));
        assert!(record.destination("zzz").is_none());
    }
}
