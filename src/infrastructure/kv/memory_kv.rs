//! In-process store for development and tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::time::Instant;
use tracing::debug;

use super::command::{Command, Reply};
use super::transport::{KvError, KvResult, KvTransport};

#[derive(Debug, Clone)]
enum Stored {
    Text(String),
    Set(BTreeSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Stored,
    expires_at: Option<Instant>,
}

impl Entry {
    fn text(value: String) -> Self {
        Self {
            value: Stored::Text(value),
            expires_at: None,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Expired entries are swept once every this many `SET NX EX` claims.
const SWEEP_EVERY_CLAIMS: u64 = 1024;

fn wrong_type() -> KvError {
    KvError::Command("WRONGTYPE Operation against a key holding the wrong kind of value".into())
}

/// A store kept in sharded in-process maps.
///
/// Every command locks only the shard of its key, so `INCR` and `SET NX EX`
/// are atomic under concurrent callers within the process. State is lost on
/// restart and is not shared between replicas.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, Entry>,
    claims: AtomicU64,
}

impl MemoryKv {
    pub fn new() -> Self {
        debug!("Using in-memory KV store");
        Self::default()
    }

    fn get(&self, key: &str) -> KvResult<Reply> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            None => return Ok(Reply::Nil),
            Some(entry) if entry.is_live(now) => {
                return match &entry.value {
                    Stored::Text(s) => Ok(Reply::Text(s.clone())),
                    Stored::Set(_) => Err(wrong_type()),
                };
            }
            Some(_) => true,
        };
        if expired {
            self.entries.remove_if(key, |_, e| !e.is_live(now));
        }
        Ok(Reply::Nil)
    }

    fn set_nx_ex(&self, key: String, value: String, ttl_seconds: u64) -> KvResult<Reply> {
        if ttl_seconds == 0 {
            return Err(KvError::Command("invalid expire time in 'set' command".into()));
        }
        let now = Instant::now();
        let entry = Entry {
            value: Stored::Text(value),
            expires_at: Some(now + Duration::from_secs(ttl_seconds)),
        };
        let claimed = match self.entries.entry(key) {
            MapEntry::Occupied(mut occupied) => {
                let live = occupied.get().is_live(now);
                if !live {
                    occupied.insert(entry);
                }
                !live
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        };

        // Dedupe keys are rarely touched again once their window passes
        let claims = self.claims.fetch_add(1, Ordering::Relaxed) + 1;
        if claims.is_multiple_of(SWEEP_EVERY_CLAIMS) {
            self.sweep_expired(now);
        }

        Ok(if claimed {
            Reply::Text("OK".into())
        } else {
            Reply::Nil
        })
    }

    fn sweep_expired(&self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.is_live(now));
        debug!(removed = before.saturating_sub(self.entries.len()), "Swept expired KV entries");
    }

    fn incr(&self, key: String) -> KvResult<Reply> {
        let now = Instant::now();
        match self.entries.entry(key) {
            MapEntry::Occupied(mut occupied) => {
                let current = if occupied.get().is_live(now) {
                    match &occupied.get().value {
                        Stored::Text(s) => s.parse::<i64>().map_err(|_| {
                            KvError::Command("value is not an integer or out of range".into())
                        })?,
                        Stored::Set(_) => return Err(wrong_type()),
                    }
                } else {
                    0
                };
                let next = current.checked_add(1).ok_or_else(|| {
                    KvError::Command("increment or decrement would overflow".into())
                })?;
                let expires_at = occupied.get().expires_at.filter(|at| *at > now);
                occupied.insert(Entry {
                    value: Stored::Text(next.to_string()),
                    expires_at,
                });
                Ok(Reply::Integer(next))
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::text("1".into()));
                Ok(Reply::Integer(1))
            }
        }
    }

    fn sadd(&self, key: String, member: String) -> KvResult<Reply> {
        let mut entry = self.entries.entry(key).or_insert_with(|| Entry {
            value: Stored::Set(BTreeSet::new()),
            expires_at: None,
        });
        match &mut entry.value {
            Stored::Set(members) => Ok(Reply::Integer(i64::from(members.insert(member)))),
            Stored::Text(_) => Err(wrong_type()),
        }
    }

    fn srem(&self, key: &str, member: &str) -> KvResult<Reply> {
        match self.entries.get_mut(key) {
            None => Ok(Reply::Integer(0)),
            Some(mut entry) => match &mut entry.value {
                Stored::Set(members) => Ok(Reply::Integer(i64::from(members.remove(member)))),
                Stored::Text(_) => Err(wrong_type()),
            },
        }
    }

    fn smembers(&self, key: &str) -> KvResult<Reply> {
        match self.entries.get(key) {
            None => Ok(Reply::Array(Vec::new())),
            Some(entry) => match &entry.value {
                Stored::Set(members) => Ok(Reply::Array(
                    members.iter().cloned().map(Reply::Text).collect(),
                )),
                Stored::Text(_) => Err(wrong_type()),
            },
        }
    }

    fn apply(&self, command: Command) -> KvResult<Reply> {
        match command {
            Command::Ping => Ok(Reply::Text("PONG".into())),
            Command::Get(key) => self.get(&key),
            Command::MGet(keys) => Ok(Reply::Array(
                keys.iter()
                    .map(|k| self.get(k).unwrap_or(Reply::Nil))
                    .collect(),
            )),
            Command::Set(key, value) => {
                self.entries.insert(key, Entry::text(value));
                Ok(Reply::Text("OK".into()))
            }
            Command::SetNxEx {
                key,
                value,
                ttl_seconds,
            } => self.set_nx_ex(key, value, ttl_seconds),
            Command::Incr(key) => self.incr(key),
            Command::SAdd(key, member) => self.sadd(key, member),
            Command::SRem(key, member) => self.srem(&key, &member),
            Command::SMembers(key) => self.smembers(&key),
            Command::Del(key) => Ok(Reply::Integer(i64::from(
                self.entries.remove(&key).is_some(),
            ))),
        }
    }
}

#[async_trait]
impl KvTransport for MemoryKv {
    async fn execute(&self, command: Command) -> KvResult<Reply> {
        self.apply(command)
    }

    async fn pipeline(&self, commands: Vec<Command>) -> KvResult<Vec<KvResult<Reply>>> {
        Ok(commands.into_iter().map(|c| self.apply(c)).collect())
    }

    async fn ping(&self) -> bool {
        true
    }
}
