//! Transport trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use super::command::{Command, Reply};

/// Errors that can occur while talking to the store.
#[derive(Debug, Clone, Error)]
pub enum KvError {
    #[error("kv request timed out")]
    Timeout,

    #[error("kv transport error: {message}")]
    Transport { message: String, retryable: bool },

    #[error("kv returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("kv command error: {0}")]
    Command(String),

    #[error("malformed kv response: {0}")]
    Malformed(String),

    #[error("kv backend not configured: {0}")]
    NotConfigured(String),
}

impl KvError {
    /// Whether the failure is transient and the call may be replayed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Transport { retryable, .. } => *retryable,
            Self::Status { status, .. } => super::retry::is_retryable_status(*status),
            Self::Command(_) | Self::Malformed(_) | Self::NotConfigured(_) => false,
        }
    }
}

/// Result type for transport operations.
pub type KvResult<T> = Result<T, KvError>;

/// Executes commands against a key-value store.
///
/// Implementations must make `INCR` and `SET NX EX` atomic with respect to
/// every other caller of the same store, including other processes.
///
/// # Implementations
///
/// - [`crate::infrastructure::kv::MemoryKv`] - in-process sharded maps
/// - [`crate::infrastructure::kv::HttpKv`] - remote store reached over HTTP
/// - [`crate::infrastructure::kv::RedisKv`] - native Redis connection
#[async_trait]
pub trait KvTransport: Send + Sync {
    /// Executes a single command.
    ///
    /// Idempotent commands may be retried on transient failures; others are
    /// issued exactly once.
    async fn execute(&self, command: Command) -> KvResult<Reply>;

    /// Executes an ordered batch in one round trip.
    ///
    /// The outer error covers the round trip itself. Each inner result belongs
    /// to the command at the same position; a failed item does not affect the
    /// others.
    async fn pipeline(&self, commands: Vec<Command>) -> KvResult<Vec<KvResult<Reply>>>;

    /// Checks if the backend is reachable.
    async fn ping(&self) -> bool;
}
