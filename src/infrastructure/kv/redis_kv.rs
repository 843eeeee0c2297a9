//! Native Redis transport.

use async_trait::async_trait;
use redis::{Client, RedisError, Value, aio::ConnectionManager};
use tokio::time::timeout;
use tracing::{debug, info};

use super::command::{Command, Reply, all_idempotent};
use super::retry::RetryPolicy;
use super::transport::{KvError, KvResult, KvTransport};

/// Redis transport over a shared, auto-reconnecting connection.
pub struct RedisKv {
    connection: ConnectionManager,
    policy: RetryPolicy,
}

impl RedisKv {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::NotConfigured`] if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(redis_url: &str, policy: RetryPolicy) -> KvResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url)
            .map_err(|e| KvError::NotConfigured(format!("Failed to create Redis client: {e}")))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| KvError::NotConfigured(format!("Failed to connect to Redis: {e}")))?;

        let kv = Self { connection, policy };
        if !kv.ping().await {
            return Err(KvError::NotConfigured("Redis PING failed".into()));
        }

        info!("✓ Connected to Redis");
        Ok(kv)
    }

    async fn query_cmd(&self, cmd: &redis::Cmd) -> KvResult<Value> {
        let mut conn = self.connection.clone();
        match timeout(self.policy.timeout, cmd.query_async::<Value>(&mut conn)).await {
            Ok(result) => result.map_err(map_redis_error),
            Err(_) => Err(KvError::Timeout),
        }
    }

    async fn query_pipe(&self, pipe: &redis::Pipeline) -> KvResult<Vec<Value>> {
        let mut conn = self.connection.clone();
        match timeout(self.policy.timeout, pipe.query_async::<Vec<Value>>(&mut conn)).await {
            Ok(result) => result.map_err(map_redis_error),
            Err(_) => Err(KvError::Timeout),
        }
    }
}

fn to_redis_cmd(command: &Command) -> redis::Cmd {
    let args = command.to_args();
    let mut cmd = redis::cmd(&args[0]);
    for arg in &args[1..] {
        cmd.arg(arg);
    }
    cmd
}

fn map_redis_error(err: RedisError) -> KvError {
    if err.is_timeout() {
        return KvError::Timeout;
    }
    let retryable = err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error();
    if retryable {
        KvError::Transport {
            message: err.to_string(),
            retryable,
        }
    } else {
        KvError::Command(err.to_string())
    }
}

fn to_reply(value: Value) -> KvResult<Reply> {
    match value {
        Value::Nil => Ok(Reply::Nil),
        Value::Int(n) => Ok(Reply::Integer(n)),
        Value::BulkString(bytes) => String::from_utf8(bytes)
            .map(Reply::Text)
            .map_err(|e| KvError::Malformed(e.to_string())),
        Value::SimpleString(s) => Ok(Reply::Text(s)),
        Value::Okay => Ok(Reply::Text("OK".into())),
        Value::ServerError(e) => Err(KvError::Command(e.to_string())),
        Value::Array(items) | Value::Set(items) => items
            .into_iter()
            .map(to_reply)
            .collect::<KvResult<Vec<_>>>()
            .map(Reply::Array),
        other => Err(KvError::Malformed(format!("unsupported Redis value {other:?}"))),
    }
}

#[async_trait]
impl KvTransport for RedisKv {
    async fn execute(&self, command: Command) -> KvResult<Reply> {
        let cmd = to_redis_cmd(&command);
        let value = self
            .policy
            .run(command.name(), command.is_idempotent(), || self.query_cmd(&cmd))
            .await?;
        to_reply(value)
    }

    async fn pipeline(&self, commands: Vec<Command>) -> KvResult<Vec<KvResult<Reply>>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        // Failed commands come back as per-item server errors
        let mut pipe = redis::pipe();
        pipe.ignore_errors();
        for command in &commands {
            pipe.add_command(to_redis_cmd(command));
        }

        let values = self
            .policy
            .run("PIPELINE", all_idempotent(&commands), || self.query_pipe(&pipe))
            .await?;

        if values.len() != commands.len() {
            return Err(KvError::Malformed(format!(
                "pipeline returned {} results for {} commands",
                values.len(),
                commands.len()
            )));
        }

        Ok(values.into_iter().map(to_reply).collect())
    }

    async fn ping(&self) -> bool {
        match self.query_cmd(&redis::cmd("PING")).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Redis PING failed: {}", e);
                false
            }
        }
    }
}
