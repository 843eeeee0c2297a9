//! `HttpKv` against a local fake of the remote store.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use link_rotator::domain::entities::NewSlug;
use link_rotator::domain::repositories::SlugRepository;
use link_rotator::infrastructure::kv::{Command, HttpKv, KvError, KvTransport, Reply, RetryPolicy};
use link_rotator::infrastructure::persistence::{KeySpace, KvSlugRepository};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "test-token";

#[derive(Default)]
struct FakeStore {
    strings: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
}

#[derive(Clone, Default)]
struct FakeKv {
    store: Arc<Mutex<FakeStore>>,
    requests: Arc<AtomicUsize>,
    /// Requests still to be answered with `503`.
    failures: Arc<AtomicUsize>,
    /// Delay before every reply, in milliseconds.
    delay_ms: Arc<AtomicU64>,
}

impl FakeKv {
    fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    fn delay_replies(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn stall(&self) {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Counts the request; returns an error response while failures remain.
    fn gate(&self, headers: &HeaderMap) -> Option<Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {TOKEN}"));
        if !authorized {
            return Some((StatusCode::UNAUTHORIZED, "unauthorized").into_response());
        }

        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        injected.then(|| (StatusCode::SERVICE_UNAVAILABLE, "try again").into_response())
    }

    fn apply(&self, args: &[String]) -> Value {
        let mut store = self.store.lock().unwrap();
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();

        match args.first().map(|s| s.to_ascii_uppercase()).as_deref() {
            Some("PING") => json!({ "result": "PONG" }),
            Some("GET") => json!({ "result": store.strings.get(&arg(1)) }),
            Some("MGET") => {
                let values: Vec<Option<&String>> =
                    args[1..].iter().map(|k| store.strings.get(k)).collect();
                json!({ "result": values })
            }
            Some("SET") => {
                let nx = args.iter().any(|a| a.eq_ignore_ascii_case("NX"));
                if nx && store.strings.contains_key(&arg(1)) {
                    return json!({ "result": null });
                }
                store.strings.insert(arg(1), arg(2));
                json!({ "result": "OK" })
            }
            Some("INCR") => {
                let entry = store.strings.entry(arg(1)).or_insert_with(|| "0".to_string());
                let Ok(n) = entry.parse::<i64>() else {
                    return json!({ "error": "ERR value is not an integer" });
                };
                *entry = (n + 1).to_string();
                json!({ "result": n + 1 })
            }
            Some("SADD") => {
                let added = store.sets.entry(arg(1)).or_default().insert(arg(2));
                json!({ "result": i64::from(added) })
            }
            Some("SREM") => {
                let removed = store
                    .sets
                    .get_mut(&arg(1))
                    .is_some_and(|s| s.remove(&arg(2)));
                json!({ "result": i64::from(removed) })
            }
            Some("SMEMBERS") => {
                let members: Vec<String> = store
                    .sets
                    .get(&arg(1))
                    .map(|s| s.iter().cloned().collect())
                    .unwrap_or_default();
                json!({ "result": members })
            }
            Some("DEL") => {
                let removed = store.strings.remove(&arg(1)).is_some()
                    | store.sets.remove(&arg(1)).is_some();
                json!({ "result": i64::from(removed) })
            }
            _ => json!({ "error": "ERR unknown command" }),
        }
    }
}

async fn command_handler(
    State(kv): State<FakeKv>,
    headers: HeaderMap,
    Json(args): Json<Vec<String>>,
) -> Response {
    if let Some(rejection) = kv.gate(&headers) {
        return rejection;
    }
    kv.stall().await;
    Json(kv.apply(&args)).into_response()
}

async fn pipeline_handler(
    State(kv): State<FakeKv>,
    headers: HeaderMap,
    Json(batch): Json<Vec<Vec<String>>>,
) -> Response {
    if let Some(rejection) = kv.gate(&headers) {
        return rejection;
    }
    kv.stall().await;
    let replies: Vec<Value> = batch.iter().map(|args| kv.apply(args)).collect();
    Json(replies).into_response()
}

/// Starts the fake on an ephemeral port and returns it with its base URL.
async fn spawn_fake_kv() -> (FakeKv, String) {
    let fake = FakeKv::default();
    let app = Router::new()
        .route("/", post(command_handler))
        .route("/pipeline", post(pipeline_handler))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (fake, format!("http://{addr}"))
}

fn client(base_url: &str, token: &str) -> HttpKv {
    HttpKv::new(base_url, token, RetryPolicy::new(3, Duration::from_secs(2))).unwrap()
}

#[tokio::test]
async fn test_ping() {
    let (_fake, url) = spawn_fake_kv().await;

    assert!(client(&url, TOKEN).ping().await);
    assert!(!client(&url, "wrong-token").ping().await);
}

#[tokio::test]
async fn test_idempotent_command_is_retried_on_503() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = client(&url, TOKEN);
    fake.fail_next(2);

    let reply = kv.execute(Command::Get("missing".into())).await.unwrap();

    assert_eq!(reply, Reply::Nil);
    assert_eq!(fake.requests(), 3);
}

#[tokio::test]
async fn test_retries_stop_at_max_attempts() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = client(&url, TOKEN);
    fake.fail_next(5);

    let err = kv.execute(Command::Get("k".into())).await.unwrap_err();

    assert!(matches!(err, KvError::Status { status: 503, .. }));
    assert_eq!(fake.requests(), 3);
}

#[tokio::test]
async fn test_incr_is_never_retried() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = client(&url, TOKEN);
    fake.fail_next(1);

    let err = kv.execute(Command::Incr("rr".into())).await.unwrap_err();
    assert!(matches!(err, KvError::Status { status: 503, .. }));
    assert_eq!(fake.requests(), 1);

    let reply = kv.execute(Command::Incr("rr".into())).await.unwrap();
    assert_eq!(reply, Reply::Integer(1));
}

#[tokio::test]
async fn test_set_nx_is_never_retried() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = client(&url, TOKEN);
    fake.fail_next(1);

    let claim = Command::SetNxEx {
        key: "dedupe".into(),
        value: "1".into(),
        ttl_seconds: 3,
    };
    assert!(kv.execute(claim).await.is_err());
    assert_eq!(fake.requests(), 1);
}

#[tokio::test]
async fn test_auth_failure_is_not_retried() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = client(&url, "wrong-token");

    let err = kv.execute(Command::Get("k".into())).await.unwrap_err();

    assert!(matches!(err, KvError::Status { status: 401, .. }));
    assert_eq!(fake.requests(), 1);
}

#[tokio::test]
async fn test_slow_reply_times_out_and_is_retried() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = HttpKv::new(&url, TOKEN, RetryPolicy::new(3, Duration::from_millis(100))).unwrap();
    fake.delay_replies(Duration::from_secs(2));

    let err = kv.execute(Command::Get("k".into())).await.unwrap_err();

    assert!(matches!(err, KvError::Timeout));
    assert_eq!(fake.requests(), 3);
}

#[tokio::test]
async fn test_slow_incr_times_out_without_retry() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = HttpKv::new(&url, TOKEN, RetryPolicy::new(3, Duration::from_millis(100))).unwrap();
    fake.delay_replies(Duration::from_secs(2));

    let err = kv.execute(Command::Incr("rr".into())).await.unwrap_err();

    assert!(matches!(err, KvError::Timeout));
    assert_eq!(fake.requests(), 1);
}

#[tokio::test]
async fn test_refused_connection_is_retried() {
    // Reserve a port, then free it so nothing listens there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let kv = client(&format!("http://{addr}"), TOKEN);
    let started = tokio::time::Instant::now();

    let err = kv.execute(Command::Get("k".into())).await.unwrap_err();

    assert!(matches!(err, KvError::Transport { retryable: true, .. }));
    // Two backoff delays (200ms + 400ms) separate the three attempts
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_pipeline_keeps_per_command_errors() {
    let (_fake, url) = spawn_fake_kv().await;
    let kv = client(&url, TOKEN);

    let replies = kv
        .pipeline(vec![
            Command::Set("counter".into(), "not-a-number".into()),
            Command::Incr("counter".into()),
            Command::Get("counter".into()),
        ])
        .await
        .unwrap();

    assert_eq!(replies.len(), 3);
    assert!(replies[0].as_ref().unwrap().is_ok_status());
    assert!(matches!(replies[1], Err(KvError::Command(_))));
    assert_eq!(
        replies[2].clone().unwrap(),
        Reply::Text("not-a-number".into())
    );
}

#[tokio::test]
async fn test_pipeline_with_incr_is_not_retried() {
    let (fake, url) = spawn_fake_kv().await;
    let kv = client(&url, TOKEN);
    fake.fail_next(1);

    let result = kv
        .pipeline(vec![Command::Get("a".into()), Command::Incr("b".into())])
        .await;

    assert!(result.is_err());
    assert_eq!(fake.requests(), 1);
}

#[tokio::test]
async fn test_slug_repository_over_http() {
    let (_fake, url) = spawn_fake_kv().await;
    let repo = KvSlugRepository::new(Arc::new(client(&url, TOKEN)), KeySpace::new("it"));

    repo.create_slug(NewSlug {
        slug: "docs".into(),
        destination_name: "primary".into(),
        destination_urls: vec!["https://a.example".into(), "https://b.example".into()],
    })
    .await
    .unwrap();

    let config = repo.get_redirect_config("docs").await.unwrap().unwrap();
    assert!(config.enabled);
    assert_eq!(config.enabled_slots().len(), 2);

    assert_eq!(repo.next_round_robin_cursor("docs").await.unwrap(), 0);
    assert_eq!(repo.next_round_robin_cursor("docs").await.unwrap(), 1);

    repo.record_raw_hit("docs").await.unwrap();
    let slugs = repo.list_slugs().await.unwrap();
    assert_eq!(slugs.len(), 1);
    assert_eq!(slugs[0].raw_hit_count, 1);

    repo.delete_slug("docs").await.unwrap();
    assert!(repo.get_redirect_config("docs").await.unwrap().is_none());
    assert!(repo.list_slugs().await.unwrap().is_empty());
}
