//! Remote store reached over HTTP.
//!
//! Commands are posted as JSON argument arrays (`["INCR", "key"]`) to the
//! base URL; batches are posted as an array of such arrays to `/pipeline`.
//! Every reply is an object `{"result": ..., "error": "..."}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::command::{Command, Reply, all_idempotent};
use super::retry::RetryPolicy;
use super::transport::{KvError, KvResult, KvTransport};

/// Characters of an error body kept in [`KvError::Status`].
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl CommandResponse {
    fn into_reply(self) -> KvResult<Reply> {
        match self.error {
            Some(error) => Err(KvError::Command(error)),
            None => Reply::from_json(self.result),
        }
    }
}

/// HTTP transport with per-call timeout and retry of idempotent calls.
pub struct HttpKv {
    client: Client,
    base_url: String,
    pipeline_url: String,
    token: String,
    policy: RetryPolicy,
}

impl HttpKv {
    /// Builds a transport for `base_url`, authenticating with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::NotConfigured`] if the URL or token is empty or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, token: &str, policy: RetryPolicy) -> KvResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(KvError::NotConfigured("KV_REST_URL is empty".into()));
        }
        if token.trim().is_empty() {
            return Err(KvError::NotConfigured("KV_REST_TOKEN is empty".into()));
        }

        let client = Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| KvError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        info!("Using HTTP KV store at {}", base_url);

        Ok(Self {
            client,
            pipeline_url: format!("{base_url}/pipeline"),
            base_url,
            token: token.trim().to_string(),
            policy,
        })
    }

    /// Posts one JSON body and returns the decoded JSON reply.
    async fn post(&self, url: &str, body: &Value) -> KvResult<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KvError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        response.json::<Value>().await.map_err(map_reqwest_error)
    }
}

/// Classifies client errors; connection-level failures are retryable.
fn map_reqwest_error(err: reqwest::Error) -> KvError {
    if err.is_timeout() {
        KvError::Timeout
    } else if err.is_decode() || err.is_body() {
        KvError::Malformed(err.to_string())
    } else {
        KvError::Transport {
            retryable: err.is_connect() || err.is_request(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl KvTransport for HttpKv {
    async fn execute(&self, command: Command) -> KvResult<Reply> {
        let body = json!(command.to_args());
        let raw = self
            .policy
            .run(command.name(), command.is_idempotent(), || {
                self.post(&self.base_url, &body)
            })
            .await?;

        let response: CommandResponse =
            serde_json::from_value(raw).map_err(|e| KvError::Malformed(e.to_string()))?;
        response.into_reply()
    }

    async fn pipeline(&self, commands: Vec<Command>) -> KvResult<Vec<KvResult<Reply>>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        let body = Value::Array(commands.iter().map(|c| json!(c.to_args())).collect());
        let raw = self
            .policy
            .run("PIPELINE", all_idempotent(&commands), || {
                self.post(&self.pipeline_url, &body)
            })
            .await?;

        let responses: Vec<CommandResponse> =
            serde_json::from_value(raw).map_err(|e| KvError::Malformed(e.to_string()))?;
        if responses.len() != commands.len() {
            return Err(KvError::Malformed(format!(
                "pipeline returned {} results for {} commands",
                responses.len(),
                commands.len()
            )));
        }

        Ok(responses
            .into_iter()
            .map(CommandResponse::into_reply)
            .collect())
    }

    async fn ping(&self) -> bool {
        match self.execute(Command::Ping).await {
            Ok(_) => true,
            Err(e) => {
                debug!("KV ping failed: {}", e);
                false
            }
        }
    }
}
