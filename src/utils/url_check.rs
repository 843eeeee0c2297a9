//! Destination URL checks.

use url::Url;

use crate::error::StoreError;

/// Returns true if `raw` parses as an absolute `http:` or `https:` URL.
pub fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Checks the structural invariants of a destination URL group.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if the list is empty or any URL is not
/// an absolute http/https URL.
pub fn validate_destination_urls(urls: &[String]) -> Result<(), StoreError> {
    if urls.is_empty() {
        return Err(StoreError::Invalid(
            "destination needs at least one URL".into(),
        ));
    }
    if let Some(bad) = urls.iter().find(|u| !is_http_url(u)) {
        return Err(StoreError::Invalid(format!(
            "not an http(s) URL: {bad}"
        )));
    }
    Ok(())
}

/// Derives a display label from a URL: host plus non-root path.
pub fn display_name(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            let path = match url.path() {
                "/" => "",
                p => p,
            };
            let name = format!("{host}{path}");
            if name.is_empty() { raw.to_string() } else { name }
        }
        Err(_) => raw.to_string(),
    }
}
