//! Versioned JSON encoding of slug records.
//!
//! Records are always written as version 3. Reading accepts every shape
//! that has ever been stored:
//!
//! - v3: `{version: 3, slug, enabled, createdAt, destinations: [{id, name, urls, enabled, createdAt}]}`
//! - v2: same layout with a single `url` per destination
//! - v1: `{slug?, destination, createdAt?}`, one always-enabled URL
//!
//! Everything is normalized into [`SlugRecord`] here so nothing downstream
//! sees historical shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{DestinationRecord, SlugRecord};
use crate::error::StoreError;
use crate::utils::flag::coerce_flag;
use crate::utils::url_check::display_name;

/// Version written by [`encode_record`].
pub const RECORD_VERSION: u64 = 3;

/// Destination id given to the single URL of a v1 record.
pub const LEGACY_DESTINATION_ID: &str = "legacy";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredDestinationOut<'a> {
    id: &'a str,
    name: &'a str,
    urls: &'a [String],
    enabled: bool,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredSlugOut<'a> {
    version: u64,
    slug: &'a str,
    enabled: bool,
    created_at: DateTime<Utc>,
    destinations: Vec<StoredDestinationOut<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionedRecord {
    version: u64,
    slug: String,
    #[serde(default)]
    enabled: Option<Value>,
    #[serde(default)]
    created_at: Option<Value>,
    destinations: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    #[serde(default)]
    slug: Option<Value>,
    destination: String,
    #[serde(default)]
    created_at: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Versioned(VersionedRecord),
    Legacy(LegacyRecord),
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StoredDestination {
    id: Option<Value>,
    name: Option<Value>,
    url: Option<Value>,
    urls: Option<Value>,
    enabled: Option<Value>,
    created_at: Option<Value>,
}

/// Serializes a record in the current format.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if serialization fails.
pub fn encode_record(record: &SlugRecord) -> Result<String, StoreError> {
    let out = StoredSlugOut {
        version: RECORD_VERSION,
        slug: &record.slug,
        enabled: record.enabled,
        created_at: record.created_at,
        destinations: record
            .destinations
            .iter()
            .map(|d| StoredDestinationOut {
                id: &d.id,
                name: &d.name,
                urls: &d.urls,
                enabled: d.enabled,
                created_at: d.created_at,
            })
            .collect(),
    };
    serde_json::to_string(&out).map_err(|e| StoreError::Invalid(e.to_string()))
}

/// Parses any stored shape into a [`SlugRecord`].
///
/// `key_slug` fills in the slug of v1 records that did not store one.
/// Returns `None` for input that matches no known shape.
pub fn decode_record(raw: &str, key_slug: &str) -> Option<SlugRecord> {
    let now = Utc::now();
    match serde_json::from_str::<StoredRecord>(raw).ok()? {
        StoredRecord::Versioned(rec) if matches!(rec.version, 2 | 3) => {
            let destinations = rec
                .destinations
                .into_iter()
                .filter_map(|d| decode_destination(d, now))
                .collect();
            Some(SlugRecord {
                slug: rec.slug,
                enabled: coerce_flag(rec.enabled.as_ref()),
                created_at: parse_timestamp(rec.created_at.as_ref()).unwrap_or(now),
                destinations,
            })
        }
        StoredRecord::Versioned(_) => None,
        StoredRecord::Legacy(rec) => {
            let created_at = parse_timestamp(rec.created_at.as_ref()).unwrap_or(now);
            let slug = match rec.slug {
                Some(Value::String(s)) => s,
                _ => key_slug.to_string(),
            };
            Some(SlugRecord {
                slug,
                enabled: true,
                created_at,
                destinations: vec![DestinationRecord::new(
                    LEGACY_DESTINATION_ID.to_string(),
                    display_name(&rec.destination),
                    vec![rec.destination],
                    created_at,
                )],
            })
        }
    }
}

fn decode_destination(value: Value, now: DateTime<Utc>) -> Option<DestinationRecord> {
    let stored: StoredDestination = serde_json::from_value(value).ok()?;

    let id = match stored.id {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let urls = collect_urls(stored.urls, stored.url);
    if id.is_empty() || urls.is_empty() {
        return None;
    }

    let name = match stored.name {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => display_name(&urls[0]),
    };

    Some(DestinationRecord {
        id,
        name,
        enabled: coerce_flag(stored.enabled.as_ref()),
        created_at: parse_timestamp(stored.created_at.as_ref()).unwrap_or(now),
        urls,
    })
}

/// Prefers the v3 `urls` list and falls back to the v2 single `url`.
fn collect_urls(urls: Option<Value>, url: Option<Value>) -> Vec<String> {
    let from_list: Vec<String> = match urls {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    if !from_list.is_empty() {
        return from_list;
    }
    match url {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    }
}

fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        _ => None,
    }
}
