//! Handler for the fallback page shown for disabled slugs.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::api::dto::fallback::FallbackQuery;
use crate::state::AppState;

/// Page served when no custom fallback HTML is stored.
pub const DEFAULT_FALLBACK_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width,initial-scale=1" />
    <title>Link unavailable</title>
  </head>
  <body>
    <main>
      <h1>Link unavailable</h1>
      <p>This short link is disabled or has no enabled destinations.</p>
      <p>Code: <code>{{slug}}</code></p>
    </main>
  </body>
</html>
"#;

/// Renders the fallback page.
///
/// # Endpoint
///
/// `GET /fallback?slug=...&reason=...` (path configurable)
///
/// Uses the stored fallback HTML, or [`DEFAULT_FALLBACK_HTML`] when none is
/// stored or the store cannot be read. `{{slug}}` and `{{reason}}` are
/// replaced with the HTML-escaped query values.
pub async fn fallback_handler(
    State(state): State<AppState>,
    Query(query): Query<FallbackQuery>,
) -> Response {
    let stored = match state.repository.get_fallback_html().await {
        Ok(html) => html.filter(|h| !h.trim().is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Fallback HTML unavailable, using default");
            None
        }
    };
    let template = stored.as_deref().unwrap_or(DEFAULT_FALLBACK_HTML);
    let html = fill_placeholders(template, &query);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        html,
    )
        .into_response()
}

fn fill_placeholders(template: &str, query: &FallbackQuery) -> String {
    template
        .replace("{{slug}}", &escape_html(&query.slug))
        .replace("{{reason}}", &escape_html(&query.reason))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")&'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&amp;&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_fill_placeholders_replaces_all() {
        let query = FallbackQuery {
            slug: "docs".to_string(),
            reason: "slug_disabled".to_string(),
        };
        let out = fill_placeholders("{{slug}} {{reason}} {{slug}} {{other}}", &query);
        assert_eq!(out, "docs slug_disabled docs {{other}}");
    }
}
