//! Inbound query parameters
//!
//! Read once per invocation: `id` pre-fills the identifier, `resume` or
//! `resumeUrl` carries the callback location. The first occurrence of a
//! parameter wins; blank values are ignored.
//!
//! The resume value is kept exactly as it appears in the query. Target
//! resolution owns its decoding, so a callback URL with its own escapes is
//! decoded no more than twice in total.

use relay_sdk::util::percent_decode_repeated;
use url::Url;

/// Parameters understood by the relay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundParams {
    id: Option<String>,
    resume: Option<String>,
}

impl InboundParams {
    /// Parse a query string (`id=1&resume=...`, leading `?` optional) or a full URL
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let query = match Url::parse(input) {
            Ok(url) if url.has_host() => url.query().unwrap_or("").to_string(),
            _ => input.trim_start_matches('?').to_string(),
        };

        let mut params = Self::default();
        let mut resume_url = None;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let raw_value = raw_value.trim();
            if decode_component(raw_value).trim().is_empty() {
                continue;
            }
            match decode_component(raw_key).as_str() {
                "id" if params.id.is_none() => {
                    params.id = Some(decode_component(raw_value).trim().to_string())
                }
                "resume" if params.resume.is_none() => params.resume = Some(raw_value.to_string()),
                "resumeUrl" if resume_url.is_none() => resume_url = Some(raw_value.to_string()),
                _ => {}
            }
        }

        params.resume = params.resume.or(resume_url);
        params
    }

    /// Tracking identifier
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Resume value as it appeared in the query, still percent-encoded
    pub fn resume_url(&self) -> Option<&str> {
        self.resume.as_deref()
    }
}

/// One round of form decoding (`+` is a space)
fn decode_component(raw: &str) -> String {
    percent_decode_repeated(&raw.replace('+', " "), 1)
}
