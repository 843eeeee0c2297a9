//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, QueueStatus};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **KV**: Transport ping
/// 2. **Metrics Queue**: Open or closed, with depth, capacity and dropped jobs
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "kv": { "status": "ok", "message": "KV reachable" },
///     "metrics_queue": { "status": "ok", "depth": 0, "capacity": 10000, "dropped": 0 }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let kv_check = check_kv(&state).await;
    let queue_check = check_metrics_queue(&state);

    let all_healthy = kv_check.status == "ok" && queue_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            kv: kv_check,
            metrics_queue: queue_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_kv(state: &AppState) -> CheckStatus {
    if state.repository.ping().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some("KV reachable".to_string()),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some("KV ping failed".to_string()),
        }
    }
}

fn check_metrics_queue(state: &AppState) -> QueueStatus {
    let queue = state.metrics.queue();
    QueueStatus {
        status: if queue.is_closed() { "error" } else { "ok" }.to_string(),
        depth: queue.len(),
        capacity: queue.capacity(),
        dropped: queue.dropped(),
    }
}
