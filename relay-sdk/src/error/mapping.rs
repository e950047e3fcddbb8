//! Error mapping for HTTP responses
//!
//! Converts non-2xx responses from the webhook target and the Sheets API
//! into normalized `RelayError` values.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, RelayError};
use crate::util::truncate_string;

/// Map a Google API error document to a RelayError
///
/// Google APIs answer with `{"error": {"code", "message", "status"}}`.
pub fn map_google_error(status: StatusCode, json: &Value, context: &mut ErrorContext) -> RelayError {
    context.service = "sheets".to_string();

    let error = json.get("error");
    if let Some(api_status) = error.and_then(|e| e.get("status")).and_then(|s| s.as_str()) {
        context.add("api_status", api_status);
    }

    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown Sheets API error");

    RelayError::http_status(format!("{}: {}", status, message))
}

/// Map a generic HTTP error to a RelayError
///
/// The body is kept as diagnostic detail, cut to `detail_limit` characters.
pub fn map_http_error(
    status: StatusCode,
    body: &str,
    context: &mut ErrorContext,
    detail_limit: usize,
) -> RelayError {
    if context.service == "sheets" {
        if let Ok(json) = serde_json::from_str::<Value>(body) {
            return map_google_error(status, &json, context);
        }
    }

    context.add("category", classify_http_error(status));

    let body = body.trim();
    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, truncate_string(body, detail_limit))
    };

    RelayError::http_status(message)
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 => "timeout",
        429 => "rate_limit",
        500..=599 => "server",
        _ => "unknown",
    }
}
