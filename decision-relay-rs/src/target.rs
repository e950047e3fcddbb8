//! Destination resolution
//!
//! Candidates are tried in the order given by a `TargetPolicy`. The default
//! order is the row's authorization URL, then the resume URL, then the
//! configured fallback.

use std::fmt;
use std::str::FromStr;

use log::debug;
use relay_sdk::util::{percent_decode_repeated, sanitize_for_logging};
use serde::{Deserialize, Serialize};
use url::Url;

/// Rounds of percent-decoding applied to the raw `resume` query value
pub const RESUME_DECODE_ROUNDS: usize = 2;

/// Where a destination URL came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSource {
    /// Authorization column of the looked-up row
    Authorize,
    /// `resume` / `resumeUrl` inbound parameter, as found in the query
    Resume,
    /// Statically configured URL
    Fallback,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetSource::Authorize => "authorize",
            TargetSource::Resume => "resume",
            TargetSource::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

impl FromStr for TargetSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authorize" | "authorization" | "row" => Ok(TargetSource::Authorize),
            "resume" | "resumeurl" | "resume_url" => Ok(TargetSource::Resume),
            "fallback" | "static" => Ok(TargetSource::Fallback),
            other => Err(format!("unknown target source '{}'", other)),
        }
    }
}

/// Ordered list of candidate sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPolicy {
    order: Vec<TargetSource>,
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self {
            order: vec![
                TargetSource::Authorize,
                TargetSource::Resume,
                TargetSource::Fallback,
            ],
        }
    }
}

impl TargetPolicy {
    /// A policy with the given order; repeated sources keep their first position
    pub fn new(order: impl IntoIterator<Item = TargetSource>) -> Result<Self, String> {
        let mut deduped = Vec::new();
        for source in order {
            if !deduped.contains(&source) {
                deduped.push(source);
            }
        }

        if deduped.is_empty() {
            return Err("target priority must name at least one source".to_string());
        }

        Ok(Self { order: deduped })
    }

    /// Parse names such as `["resume", "authorize"]`
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let order = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<TargetSource>, String>>()?;
        Self::new(order)
    }

    pub fn order(&self) -> &[TargetSource] {
        &self.order
    }

    /// The first candidate, in policy order, that yields a usable URL
    pub fn resolve(&self, candidates: &TargetCandidates<'_>) -> Option<ResolvedTarget> {
        let resolved = self.order.iter().find_map(|&source| {
            let url = match source {
                TargetSource::Authorize => candidates.authorize.and_then(authorize_url),
                TargetSource::Resume => candidates.resume.and_then(resume_url),
                TargetSource::Fallback => candidates.fallback.and_then(fallback_url),
            }?;
            Some(ResolvedTarget { url, source })
        });

        match &resolved {
            Some(target) => debug!(
                "Resolved destination {} from {}",
                sanitize_for_logging(&target.url),
                target.source
            ),
            None => debug!("No destination candidate resolved"),
        }

        resolved
    }
}

impl fmt::Display for TargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.order.iter().map(ToString::to_string).collect();
        f.write_str(&names.join(","))
    }
}

/// Raw candidate values for one submission
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetCandidates<'a> {
    pub authorize: Option<&'a str>,
    pub resume: Option<&'a str>,
    pub fallback: Option<&'a str>,
}

/// A chosen destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub url: String,
    pub source: TargetSource,
}

/// Accepted only as an absolute URL with scheme and host
fn authorize_url(value: &str) -> Option<String> {
    absolute_url(value.trim())
}

/// Decoded, then held to the same rule as the row URL
fn resume_url(value: &str) -> Option<String> {
    let decoded = percent_decode_repeated(value.trim(), RESUME_DECODE_ROUNDS);
    let url = absolute_url(decoded.trim());
    if url.is_none() && !decoded.trim().is_empty() {
        debug!("Ignoring resume value that is not an absolute URL");
    }
    url
}

fn absolute_url(value: &str) -> Option<String> {
    let url = Url::parse(value).ok()?;
    if url.scheme().is_empty() || !url.has_host() {
        return None;
    }
    Some(value.to_string())
}

/// Used verbatim
fn fallback_url(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}
