//! Store command and reply model.
//!
//! Commands are vendor-neutral; each transport maps them onto its own wire
//! representation.

use serde_json::Value;

use super::transport::KvError;

/// A single store command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Get(String),
    MGet(Vec<String>),
    /// Set to an absolute value.
    Set(String, String),
    /// Set only if the key does not exist, with a TTL in seconds.
    SetNxEx {
        key: String,
        value: String,
        ttl_seconds: u64,
    },
    Incr(String),
    SAdd(String, String),
    SRem(String, String),
    SMembers(String),
    Del(String),
}

impl Command {
    /// Command verb as sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "PING",
            Self::Get(_) => "GET",
            Self::MGet(_) => "MGET",
            Self::Set(..) | Self::SetNxEx { .. } => "SET",
            Self::Incr(_) => "INCR",
            Self::SAdd(..) => "SADD",
            Self::SRem(..) => "SREM",
            Self::SMembers(_) => "SMEMBERS",
            Self::Del(_) => "DEL",
        }
    }

    /// Whether repeating the command leaves the store in the same state.
    ///
    /// `INCR` double-applies on replay. `SET NX` may report "already claimed"
    /// to the caller whose first attempt actually won, so it is not retried
    /// either.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Incr(_) | Self::SetNxEx { .. })
    }

    /// Full argument vector including the verb.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.name().to_string()];
        match self {
            Self::Ping => {}
            Self::Get(key) | Self::Incr(key) | Self::SMembers(key) | Self::Del(key) => {
                args.push(key.clone());
            }
            Self::MGet(keys) => args.extend(keys.iter().cloned()),
            Self::Set(key, value) | Self::SAdd(key, value) | Self::SRem(key, value) => {
                args.push(key.clone());
                args.push(value.clone());
            }
            Self::SetNxEx {
                key,
                value,
                ttl_seconds,
            } => {
                args.push(key.clone());
                args.push(value.clone());
                args.push("NX".to_string());
                args.push("EX".to_string());
                args.push(ttl_seconds.to_string());
            }
        }
        args
    }
}

/// Returns true when every command of a batch can be replayed safely.
pub fn all_idempotent(commands: &[Command]) -> bool {
    commands.iter().all(Command::is_idempotent)
}

/// A decoded store reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nil,
    Integer(i64),
    Text(String),
    Array(Vec<Reply>),
}

impl Reply {
    /// Converts a JSON `result` field into a reply.
    pub fn from_json(value: Value) -> Result<Self, KvError> {
        match value {
            Value::Null => Ok(Self::Nil),
            Value::Bool(b) => Ok(Self::Integer(i64::from(b))),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| KvError::Malformed(format!("non-integer number {n}"))),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            Value::Object(_) => Err(KvError::Malformed("unexpected object reply".to_string())),
        }
    }

    /// Reads an optional string value (`GET`).
    pub fn into_opt_string(self) -> Result<Option<String>, KvError> {
        match self {
            Self::Nil => Ok(None),
            Self::Text(s) => Ok(Some(s)),
            Self::Integer(n) => Ok(Some(n.to_string())),
            Self::Array(_) => Err(KvError::Malformed("expected string, got array".to_string())),
        }
    }

    /// Reads an integer value (`INCR`, `SADD`, `DEL`, ...).
    pub fn into_i64(self) -> Result<i64, KvError> {
        match self {
            Self::Integer(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| KvError::Malformed(format!("expected integer, got {s:?}"))),
            other => Err(KvError::Malformed(format!("expected integer, got {other:?}"))),
        }
    }

    /// Reads an array of optional strings (`MGET`, `SMEMBERS`).
    pub fn into_opt_strings(self) -> Result<Vec<Option<String>>, KvError> {
        match self {
            Self::Array(items) => items.into_iter().map(Self::into_opt_string).collect(),
            Self::Nil => Ok(Vec::new()),
            other => Err(KvError::Malformed(format!("expected array, got {other:?}"))),
        }
    }

    /// Interprets a `SET ... NX` reply: `OK` when the key was written.
    pub fn is_ok_status(&self) -> bool {
        matches!(self, Self::Text(s) if s.eq_ignore_ascii_case("OK"))
    }
}

/// Parses a stored counter; missing or garbled values read as zero.
pub fn counter_value(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.max(0) as u64)
        .unwrap_or(0)
}
