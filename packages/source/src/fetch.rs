//! Single-shot HTTP helpers.
//!
//! All HTTP sources should use [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so that status handling and
//! failure logging are the same for every endpoint.
//!
//! Requests are sent exactly once. Transient failures are surfaced to the
//! caller, which shows them as a dismissible section error.

use crate::SourceError;

/// Maximum length of the response body preview included in error logs and
/// status messages.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends an HTTP request and parses the response body as JSON.
///
/// Non-success statuses are turned into [`SourceError::Status`], using the
/// backend's `detail` field as the message when the error body is JSON.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails, the server returns a
/// non-success status, or the body cannot be parsed as JSON.
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, SourceError> {
    let response = request.send().await.inspect_err(|e| {
        log::warn!("request failed: {e}");
    })?;

    let url = response.url().to_string();
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    // Read the raw body as text first so failures can log what arrived.
    let text = response.text().await.inspect_err(|e| {
        log::warn!(
            "Response body read failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             error: {e}"
        );
    })?;

    if !status.is_success() {
        let message = error_detail(&text).unwrap_or_else(|| preview(&text));
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            log::warn!("HTTP 429 (rate limited) from {url}");
        } else if status.is_server_error() {
            log::warn!("HTTP {status} (server error) from {url}: {message}");
        } else {
            log::warn!("HTTP {status} from {url}: {message}");
        }
        return Err(SourceError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|json_err| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(json_err)
    })
}

/// Extracts the `detail` message from an error body shaped like
/// `{"detail": "..."}`.
fn error_detail(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Truncates a body for logging, respecting char boundaries.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_extracted_from_error_body() {
        assert_eq!(
            error_detail(r#"{"detail": "Location not found"}"#).as_deref(),
            Some("Location not found")
        );
        assert_eq!(error_detail("<html>oops</html>"), None);
        assert_eq!(error_detail(r#"{"error": "x"}"#), None);
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let long = "é".repeat(BODY_PREVIEW_LEN);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert!(short.len() <= BODY_PREVIEW_LEN + 3);
        assert_eq!(preview("ok"), "ok");
    }
}
