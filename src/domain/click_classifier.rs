//! Request classification for round-robin fairness and click counting.
//!
//! Everything here is a pure function of the request method and headers.
//! None of it decides whether a redirect is issued; it only decides whether
//! a hit consumes a cursor step and whether it is counted as a click.

use axum::http::{HeaderMap, Method};

use crate::utils::hash::fnv1a32_base36;

/// Lower-cased User-Agent substrings of known link scrapers and crawlers.
pub const BOT_USER_AGENT_SUBSTRINGS: &[&str] = &[
    // link preview scrapers
    "facebookexternalhit",
    "facebot",
    "metainspector",
    // ad and search crawlers
    "adsbot",
    "googlebot",
    "bingbot",
];

const MAX_USER_AGENT_LEN: usize = 512;
const MAX_ACCEPT_LEN: usize = 2048;
const MAX_IP_LEN: usize = 128;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// True if the header is present and its value differs from `expected`.
fn header_differs(headers: &HeaderMap, name: &str, expected: &str) -> bool {
    headers
        .get(name)
        .is_some_and(|v| v.as_bytes() != expected.as_bytes())
}

fn is_truthy_marker(headers: &HeaderMap, name: &str) -> bool {
    header_str(headers, name).is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Rejects ASCII control characters other than tab, LF and CR.
fn has_control_chars(value: &str) -> bool {
    value
        .chars()
        .any(|c| (c < ' ' && !matches!(c, '\t' | '\n' | '\r')) || c == '\u{7f}')
}

/// Trims and collapses whitespace runs to single spaces.
fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn accepts_html(headers: &HeaderMap) -> bool {
    let Some(accept) = header_str(headers, "accept") else {
        return false;
    };
    let accept = accept.trim();
    if accept.is_empty() || accept.len() > MAX_ACCEPT_LEN || has_control_chars(accept) {
        return false;
    }
    let lower = accept.to_ascii_lowercase();
    lower.contains("text/html") || lower.contains("application/xhtml+xml")
}

fn is_known_bot_user_agent(ua_lower: &str) -> bool {
    BOT_USER_AGENT_SUBSTRINGS
        .iter()
        .any(|bot| ua_lower.contains(bot))
}

/// Decides whether a hit may consume a round-robin step.
///
/// Returns false for non-GET methods, prefetch hints (`purpose`,
/// `sec-purpose`, router prefetch markers) and fetch metadata that does not
/// describe a user-activated top-level document navigation.
pub fn should_advance_round_robin(method: &Method, headers: &HeaderMap) -> bool {
    if method != Method::GET {
        return false;
    }

    let is_prefetch = ["purpose", "sec-purpose"].iter().any(|name| {
        header_str(headers, name).is_some_and(|v| v.to_ascii_lowercase().contains("prefetch"))
    });
    if is_prefetch {
        return false;
    }

    if is_truthy_marker(headers, "next-router-prefetch")
        || is_truthy_marker(headers, "x-middleware-prefetch")
    {
        return false;
    }

    !(header_differs(headers, "sec-fetch-user", "?1")
        || header_differs(headers, "sec-fetch-mode", "navigate")
        || header_differs(headers, "sec-fetch-dest", "document"))
}

/// Decides whether a hit counts as a valid click.
///
/// `advance_round_robin` must be the result of [`should_advance_round_robin`]
/// for the same request; a hit that may not advance the cursor is never a
/// click.
pub fn is_valid_click_request(
    method: &Method,
    headers: &HeaderMap,
    advance_round_robin: bool,
) -> bool {
    if method != Method::GET || !advance_round_robin {
        return false;
    }

    let Some(raw_ua) = header_str(headers, "user-agent") else {
        return false;
    };
    let ua = normalize_header_value(raw_ua);
    if ua.is_empty() || ua.len() > MAX_USER_AGENT_LEN || has_control_chars(&ua) {
        return false;
    }
    if is_known_bot_user_agent(&ua.to_lowercase()) {
        return false;
    }

    accepts_html(headers)
}

fn first_forwarded_ip(raw: &str) -> Option<&str> {
    let first = raw.split(',').next().unwrap_or_default().trim();
    (!first.is_empty() && first.len() <= MAX_IP_LEN).then_some(first)
}

fn single_ip(raw: &str) -> Option<&str> {
    let ip = raw.trim();
    (!ip.is_empty() && ip.len() <= MAX_IP_LEN).then_some(ip)
}

/// Picks the client IP from proxy headers, most trusted first.
pub fn client_ip(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, "x-forwarded-for")
        .and_then(first_forwarded_ip)
        .or_else(|| header_str(headers, "x-vercel-forwarded-for").and_then(first_forwarded_ip))
        .or_else(|| header_str(headers, "x-real-ip").and_then(single_ip))
        .or_else(|| header_str(headers, "cf-connecting-ip").and_then(single_ip))
}

/// Computes the short-lived dedupe fingerprint of a client.
///
/// Returns `None` when no client IP or User-Agent is available; such hits
/// are never deduplicated.
pub fn dedupe_fingerprint(headers: &HeaderMap) -> Option<String> {
    let ip = client_ip(headers)?;
    let ua = header_str(headers, "user-agent")?;
    let key = format!("{ip}::{}", normalize_header_value(ua).to_lowercase());
    Some(fnv1a32_base36(&key))
}
