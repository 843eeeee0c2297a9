//! Handler for the public slug redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use url::{Url, form_urlencoded};

use crate::domain::click_classifier::{is_valid_click_request, should_advance_round_robin};
use crate::domain::entities::Resolution;
use crate::state::AppState;

const NO_STORE: &str = "no-store";

/// Redirects a slug to one of its destinations.
///
/// # Endpoint
///
/// `GET /{slug}` and `HEAD /{slug}`
///
/// # Request Flow
///
/// 1. Classify the request (may it advance the round-robin cursor?)
/// 2. Resolve the slug, consuming at most one cursor step
/// 3. Build the response
/// 4. Hand raw-hit and valid-click recording to the metrics queue
///
/// # Responses
///
/// - **302 Found** to the selected URL
/// - **302 Found** to the fallback page with `slug` and `reason` query parameters
/// - **404 Not Found** for unknown slugs and any storage failure
///
/// Every response carries `Cache-Control: no-store`.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let advance = should_advance_round_robin(&method, &headers);
    let resolution = state.redirect_service.resolve(&slug, advance).await;

    let response = match &resolution {
        Resolution::NotFound => not_found(),
        Resolution::Fallback { slug, reason } => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("slug", slug)
                .append_pair("reason", reason.as_str())
                .finish();
            found(&format!("{}?{query}", state.fallback_path))
        }
        Resolution::Redirect { url, .. } => match Url::parse(url) {
            Ok(target) => found(target.as_str()),
            Err(e) => {
                tracing::warn!("Stored destination URL no longer parses: {}", e);
                not_found()
            }
        },
    };

    if let Some(slug) = resolution.slug() {
        state.metrics.schedule_raw_hit(slug);
    }
    if let Resolution::Redirect {
        slug,
        destination_id,
        ..
    } = &resolution
        && is_valid_click_request(&method, &headers, advance)
    {
        state
            .metrics
            .schedule_valid_click(slug, destination_id, &headers);
    }

    response
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CACHE_CONTROL, NO_STORE)],
        "Not found",
    )
        .into_response()
}

/// A `302` to `location`, or a `404` when it cannot be sent as a header.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(location) => {
            let mut response = StatusCode::FOUND.into_response();
            let headers = response.headers_mut();
            headers.insert(header::LOCATION, location);
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
            response
        }
        Err(_) => {
            tracing::warn!("Redirect target is not a valid header value");
            not_found()
        }
    }
}
