//! Key-value transport layer.
//!
//! Provides a [`KvTransport`] trait with three implementations:
//! - [`MemoryKv`] - In-process sharded maps for development and tests
//! - [`HttpKv`] - Remote store reached over HTTP with retry and backoff
//! - [`RedisKv`] - Native Redis connection
//!
//! All three expose the same atomic primitives: `INCR`, `SET NX EX` and
//! ordered pipelines.

mod command;
mod http_kv;
mod memory_kv;
mod redis_kv;
pub mod retry;
mod transport;

pub use command::{Command, Reply, all_idempotent, counter_value};
pub use http_kv::HttpKv;
pub use memory_kv::MemoryKv;
pub use redis_kv::RedisKv;
pub use retry::RetryPolicy;
pub use transport::{KvError, KvResult, KvTransport};
