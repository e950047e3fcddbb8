//! Utility module for common functionality
//!
//! This module provides common utility functions used across the Relay SDK.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

static SENSITIVE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"Bearer [A-Za-z0-9\-_.]+", "Bearer [REDACTED]"),
        (r"([?&])key=[^&\s]+", "${1}key=[REDACTED]"),
        (r"api[_-]?key[=:]\s*[A-Za-z0-9\-_]+", "api_key=[REDACTED]"),
        (r"token[=:]\s*[^\s&]+", "token=[REDACTED]"),
        (r"secret[=:]\s*[^\s&]+", "secret=[REDACTED]"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Sanitize a string for logging (remove sensitive data patterns)
pub fn sanitize_for_logging(s: &str) -> String {
    let mut result = s.to_string();
    for (re, replacement) in SENSITIVE_PATTERNS.iter() {
        result = re.replace_all(&result, *replacement).to_string();
    }
    result
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Percent-decode a value up to `rounds` times
///
/// Stops early once a round changes nothing or would produce invalid UTF-8,
/// keeping the last good value.
pub fn percent_decode_repeated(value: &str, rounds: usize) -> String {
    let mut current = value.to_string();
    for _ in 0..rounds {
        let decoded = match percent_decode_str(&current).decode_utf8() {
            Ok(Cow::Borrowed(_)) => break,
            Ok(Cow::Owned(decoded)) => decoded,
            Err(_) => break,
        };
        current = decoded;
    }
    current
}
