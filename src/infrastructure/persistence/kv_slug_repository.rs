//! [`SlugRepository`] on top of any [`KvTransport`].

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::keys::KeySpace;
use super::record_codec::{decode_record, encode_record};
use crate::domain::entities::{
    DestinationEdit, DestinationRecord, DestinationWithClicks, NewDestination, NewSlug,
    RedirectConfig, SlugDetails, SlugRecord, SlugSummary,
};
use crate::domain::repositories::SlugRepository;
use crate::error::StoreError;
use crate::infrastructure::kv::{Command, KvTransport, Reply, counter_value};
use crate::utils::{
    id::generate_destination_id,
    slug::{normalize_slug, parse_slug},
    url_check::{display_name, validate_destination_urls},
};

const ZERO: &str = "0";

/// Slug storage over a KV transport.
///
/// Multi-key writes go out as one pipeline. Counters live in their own keys
/// so the record itself is only rewritten by admin operations.
pub struct KvSlugRepository<T> {
    kv: Arc<T>,
    keys: KeySpace,
}

impl<T: KvTransport> KvSlugRepository<T> {
    pub fn new(kv: Arc<T>, keys: KeySpace) -> Self {
        Self { kv, keys }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    async fn run_pipeline(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
        self.kv
            .pipeline(commands)
            .await?
            .into_iter()
            .map(|item| item.map_err(StoreError::from))
            .collect()
    }

    async fn load(&self, slug: &str) -> Result<Option<SlugRecord>, StoreError> {
        let raw = self
            .kv
            .execute(Command::Get(self.keys.link(slug)))
            .await?
            .into_opt_string()?;
        Ok(raw.and_then(|raw| decode_record(&raw, slug)))
    }

    async fn require(&self, slug: &str) -> Result<SlugRecord, StoreError> {
        self.load(slug)
            .await?
            .ok_or_else(|| StoreError::SlugNotFound(slug.to_string()))
    }

    /// Writes the record, keeps it indexed and runs `extra` in the same round trip.
    async fn put(&self, record: &SlugRecord, extra: Vec<Command>) -> Result<(), StoreError> {
        let mut commands = vec![
            Command::Set(self.keys.link(&record.slug), encode_record(record)?),
            Command::SAdd(self.keys.index(), record.slug.clone()),
        ];
        commands.extend(extra);
        self.run_pipeline(commands).await.map(|_| ())
    }

    fn destination_keys(&self, record: &SlugRecord) -> Vec<String> {
        record
            .destinations
            .iter()
            .map(|d| self.keys.destination_clicks(&record.slug, &d.id))
            .collect()
    }

    fn unique_destination_id(record: &SlugRecord) -> String {
        loop {
            let id = generate_destination_id();
            if record.destination(&id).is_none() {
                return id;
            }
        }
    }
}

fn destination_name(name: &str, urls: &[String]) -> String {
    let name = name.trim();
    if name.is_empty() {
        urls.first().map(|u| display_name(u)).unwrap_or_default()
    } else {
        name.to_string()
    }
}

fn destination_not_found(slug: &str, destination_id: &str) -> StoreError {
    StoreError::DestinationNotFound {
        slug: slug.to_string(),
        destination_id: destination_id.to_string(),
    }
}

fn find_destination_mut<'a>(
    record: &'a mut SlugRecord,
    destination_id: &str,
) -> Result<&'a mut DestinationRecord, StoreError> {
    let slug = record.slug.clone();
    record
        .destinations
        .iter_mut()
        .find(|d| d.id == destination_id)
        .ok_or_else(|| destination_not_found(&slug, destination_id))
}

fn counter(reply: Option<Reply>) -> Result<u64, StoreError> {
    match reply {
        Some(reply) => Ok(counter_value(reply.into_opt_string()?.as_deref())),
        None => Ok(0),
    }
}

#[async_trait]
impl<T: KvTransport> SlugRepository for KvSlugRepository<T> {
    async fn get_redirect_config(&self, slug: &str) -> Result<Option<RedirectConfig>, StoreError> {
        Ok(self.load(slug).await?.as_ref().map(RedirectConfig::from))
    }

    async fn next_round_robin_cursor(&self, slug: &str) -> Result<u64, StoreError> {
        let n = self
            .kv
            .execute(Command::Incr(self.keys.round_robin(slug)))
            .await?
            .into_i64()?;
        Ok(n.saturating_sub(1).max(0) as u64)
    }

    async fn record_raw_hit(&self, slug: &str) -> Result<(), StoreError> {
        self.kv
            .execute(Command::Incr(self.keys.raw_hits(slug)))
            .await?;
        Ok(())
    }

    async fn record_valid_click(&self, slug: &str, destination_id: &str) -> Result<(), StoreError> {
        self.run_pipeline(vec![
            Command::Incr(self.keys.clicks(slug)),
            Command::Incr(self.keys.destination_clicks(slug, destination_id)),
        ])
        .await
        .map(|_| ())
    }

    async fn acquire_valid_click_dedupe(
        &self,
        slug: &str,
        fingerprint: &str,
        window_seconds: u64,
    ) -> Result<bool, StoreError> {
        if window_seconds == 0 {
            return Ok(true);
        }
        let reply = self
            .kv
            .execute(Command::SetNxEx {
                key: self.keys.dedupe(slug, fingerprint),
                value: "1".to_string(),
                ttl_seconds: window_seconds,
            })
            .await?;
        Ok(reply.is_ok_status())
    }

    async fn get_slug(&self, slug: &str) -> Result<Option<SlugRecord>, StoreError> {
        self.load(&normalize_slug(slug)).await
    }

    async fn create_slug(&self, input: NewSlug) -> Result<SlugRecord, StoreError> {
        let slug = parse_slug(&input.slug)
            .ok_or_else(|| StoreError::Invalid(format!("invalid slug: {:?}", input.slug)))?;
        validate_destination_urls(&input.destination_urls)?;

        if self.load(&slug).await?.is_some() {
            return Err(StoreError::SlugExists(slug));
        }

        let now = Utc::now();
        let destination = DestinationRecord::new(
            generate_destination_id(),
            destination_name(&input.destination_name, &input.destination_urls),
            input.destination_urls,
            now,
        );
        let record = SlugRecord {
            slug,
            enabled: true,
            created_at: now,
            destinations: vec![destination],
        };

        let zeroed = vec![
            Command::Set(self.keys.clicks(&record.slug), ZERO.into()),
            Command::Set(self.keys.raw_hits(&record.slug), ZERO.into()),
            Command::Set(
                self.keys
                    .destination_clicks(&record.slug, &record.destinations[0].id),
                ZERO.into(),
            ),
        ];
        self.put(&record, zeroed).await?;

        tracing::info!(slug = %record.slug, "Slug created");
        Ok(record)
    }

    async fn delete_slug(&self, slug: &str) -> Result<(), StoreError> {
        let slug = normalize_slug(slug);
        let destination_keys = match self.load(&slug).await? {
            Some(record) => self.destination_keys(&record),
            None => Vec::new(),
        };

        let mut commands = vec![
            Command::Del(self.keys.link(&slug)),
            Command::Del(self.keys.clicks(&slug)),
            Command::Del(self.keys.raw_hits(&slug)),
            Command::Del(self.keys.round_robin(&slug)),
        ];
        commands.extend(destination_keys.into_iter().map(Command::Del));
        commands.push(Command::SRem(self.keys.index(), slug.clone()));
        self.run_pipeline(commands).await?;

        tracing::info!(slug = %slug, "Slug deleted");
        Ok(())
    }

    async fn list_slugs(&self) -> Result<Vec<SlugSummary>, StoreError> {
        let mut members: Vec<String> = self
            .kv
            .execute(Command::SMembers(self.keys.index()))
            .await?
            .into_opt_strings()?
            .into_iter()
            .flatten()
            .collect();
        if members.is_empty() {
            return Ok(Vec::new());
        }
        members.sort();

        let mut replies = self
            .run_pipeline(vec![
                Command::MGet(members.iter().map(|s| self.keys.link(s)).collect()),
                Command::MGet(members.iter().map(|s| self.keys.clicks(s)).collect()),
                Command::MGet(members.iter().map(|s| self.keys.raw_hits(s)).collect()),
            ])
            .await?
            .into_iter();

        let mut next_values = || -> Result<Vec<Option<String>>, StoreError> {
            Ok(replies.next().unwrap_or(Reply::Nil).into_opt_strings()?)
        };
        let links = next_values()?;
        let clicks = next_values()?;
        let hits = next_values()?;

        let mut out: Vec<SlugSummary> = members
            .iter()
            .enumerate()
            .filter_map(|(i, member)| {
                let raw = links.get(i)?.as_deref()?;
                let record = decode_record(raw, member)?;
                Some(SlugSummary {
                    enabled_destination_count: record.enabled_destination_count(),
                    destination_count: record.destinations.len(),
                    total_click_count: counter_value(clicks.get(i).and_then(|c| c.as_deref())),
                    raw_hit_count: counter_value(hits.get(i).and_then(|c| c.as_deref())),
                    slug: record.slug,
                    enabled: record.enabled,
                    created_at: record.created_at,
                })
            })
            .collect();

        out.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(out)
    }

    async fn get_slug_details(&self, slug: &str) -> Result<Option<SlugDetails>, StoreError> {
        let slug = normalize_slug(slug);
        let Some(record) = self.load(&slug).await? else {
            return Ok(None);
        };

        let destination_keys = self.destination_keys(&record);
        let mut commands = vec![
            Command::Get(self.keys.clicks(&slug)),
            Command::Get(self.keys.raw_hits(&slug)),
            Command::Get(self.keys.round_robin(&slug)),
        ];
        if !destination_keys.is_empty() {
            commands.push(Command::MGet(destination_keys));
        }

        let mut replies = self.run_pipeline(commands).await?.into_iter();
        let total_click_count = counter(replies.next())?;
        let raw_hit_count = counter(replies.next())?;
        let round_robin_cursor = counter(replies.next())?.saturating_sub(1);
        let destination_counts = match replies.next() {
            Some(reply) => reply.into_opt_strings()?,
            None => Vec::new(),
        };

        let destinations = record
            .destinations
            .into_iter()
            .enumerate()
            .map(|(i, destination)| DestinationWithClicks {
                click_count: counter_value(destination_counts.get(i).and_then(|c| c.as_deref())),
                destination,
            })
            .collect();

        Ok(Some(SlugDetails {
            slug: record.slug,
            enabled: record.enabled,
            created_at: record.created_at,
            total_click_count,
            raw_hit_count,
            round_robin_cursor,
            destinations,
        }))
    }

    async fn set_slug_enabled(&self, slug: &str, enabled: bool) -> Result<SlugRecord, StoreError> {
        let mut record = self.require(&normalize_slug(slug)).await?;
        record.enabled = enabled;
        self.put(&record, Vec::new()).await?;
        Ok(record)
    }

    async fn add_destination(&self, input: NewDestination) -> Result<SlugRecord, StoreError> {
        validate_destination_urls(&input.urls)?;
        let mut record = self.require(&normalize_slug(&input.slug)).await?;

        let destination = DestinationRecord::new(
            Self::unique_destination_id(&record),
            destination_name(&input.name, &input.urls),
            input.urls,
            Utc::now(),
        );
        let counter_key = self.keys.destination_clicks(&record.slug, &destination.id);
        record.destinations.push(destination);

        self.put(&record, vec![Command::Set(counter_key, ZERO.into())])
            .await?;
        Ok(record)
    }

    async fn edit_destination(&self, input: DestinationEdit) -> Result<SlugRecord, StoreError> {
        validate_destination_urls(&input.urls)?;
        let mut record = self.require(&normalize_slug(&input.slug)).await?;

        let destination = find_destination_mut(&mut record, &input.destination_id)?;
        destination.name = destination_name(&input.name, &input.urls);
        destination.urls = input.urls;

        self.put(&record, Vec::new()).await?;
        Ok(record)
    }

    async fn set_destination_enabled(
        &self,
        slug: &str,
        destination_id: &str,
        enabled: bool,
    ) -> Result<SlugRecord, StoreError> {
        let mut record = self.require(&normalize_slug(slug)).await?;
        find_destination_mut(&mut record, destination_id)?.enabled = enabled;
        self.put(&record, Vec::new()).await?;
        Ok(record)
    }

    async fn delete_destination(
        &self,
        slug: &str,
        destination_id: &str,
    ) -> Result<SlugRecord, StoreError> {
        let mut record = self.require(&normalize_slug(slug)).await?;
        if record.destination(destination_id).is_none() {
            return Err(destination_not_found(&record.slug, destination_id));
        }
        record.destinations.retain(|d| d.id != destination_id);

        let counter_key = self.keys.destination_clicks(&record.slug, destination_id);
        self.put(&record, vec![Command::Del(counter_key)]).await?;
        Ok(record)
    }

    async fn reset_slug_click_count(&self, slug: &str) -> Result<(), StoreError> {
        let record = self.require(&normalize_slug(slug)).await?;

        let mut commands = vec![
            Command::Set(self.keys.clicks(&record.slug), ZERO.into()),
            Command::Set(self.keys.raw_hits(&record.slug), ZERO.into()),
        ];
        commands.extend(
            self.destination_keys(&record)
                .into_iter()
                .map(|key| Command::Set(key, ZERO.into())),
        );
        self.run_pipeline(commands).await.map(|_| ())
    }

    async fn reset_destination_click_count(
        &self,
        slug: &str,
        destination_id: &str,
    ) -> Result<(), StoreError> {
        let record = self.require(&normalize_slug(slug)).await?;
        if record.destination(destination_id).is_none() {
            return Err(destination_not_found(&record.slug, destination_id));
        }
        self.kv
            .execute(Command::Set(
                self.keys.destination_clicks(&record.slug, destination_id),
                ZERO.into(),
            ))
            .await?;
        Ok(())
    }

    async fn get_fallback_html(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .kv
            .execute(Command::Get(self.keys.fallback_html()))
            .await?
            .into_opt_string()?)
    }

    async fn set_fallback_html(&self, html: &str) -> Result<(), StoreError> {
        self.kv
            .execute(Command::Set(self.keys.fallback_html(), html.to_string()))
            .await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        self.kv.ping().await
    }
}
