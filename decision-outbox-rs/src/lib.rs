// decision-outbox-rs/src/lib.rs
// Append-only local record of decisions whose webhook delivery failed.
//
// - One JSON document per line, never rewritten
// - Writes are serialized through a process-local mutex
// - Public API:
//     * Outbox::append
//     * Outbox::read_all
//
// Entries are kept for operators to inspect; nothing here replays them.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, info};
use relay_sdk::ConfigProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of one outbox entry.
pub type OutboxEntryId = Uuid;

/// Default location of the outbox file.
pub const DEFAULT_OUTBOX_PATH: &str = "data/decision-outbox/undelivered.jsonl";

/// A decision that could not be delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub entry_id: OutboxEntryId,
    pub recorded_at: DateTime<Utc>,
    /// Flow that produced the decision (requester, admin, owner).
    pub flow: String,
    /// Destination that was tried, if one was resolved.
    pub target: Option<String>,
    /// The decision document exactly as it was posted.
    pub payload: Value,
    /// Truncated detail of the last failure.
    pub last_error: String,
    /// Delivery attempts made.
    pub attempts: u32,
}

impl OutboxEntry {
    pub fn new(
        flow: impl Into<String>,
        target: Option<String>,
        payload: Value,
        last_error: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            flow: flow.into(),
            target,
            payload,
            last_error: last_error.into(),
            attempts,
        }
    }
}

/// Outbox configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxConfig {
    /// Path to the JSON-lines file.
    pub path: PathBuf,
}

impl OutboxConfig {
    /// Outbox settings from `outbox_path`; `None` when the outbox is disabled.
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Option<Self> {
        provider.get_optional("outbox_path").map(|path| Self {
            path: PathBuf::from(path),
        })
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTBOX_PATH),
        }
    }
}

/// Append-only JSON-lines outbox.
pub struct Outbox {
    cfg: OutboxConfig,
    write_lock: Mutex<()>,
}

impl Outbox {
    pub fn new(cfg: OutboxConfig) -> Self {
        Self {
            cfg,
            write_lock: Mutex::new(()),
        }
    }

    /// Outbox at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(OutboxConfig { path: path.into() })
    }

    pub fn path(&self) -> &Path {
        &self.cfg.path
    }

    /// Append one entry. Earlier lines are never touched.
    pub fn append(&self, entry: &OutboxEntry) -> Result<(), OutboxError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| OutboxError::Poisoned)?;

        if let Some(parent) = self.path().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        info!(
            "Kept undelivered {} decision {} in {}",
            entry.flow,
            entry.entry_id,
            self.path().display()
        );
        Ok(())
    }

    /// Read every entry in file order. A missing file is an empty outbox.
    pub fn read_all(&self) -> Result<Vec<OutboxEntry>, OutboxError> {
        if !self.path().exists() {
            debug!("Outbox {} does not exist yet", self.path().display());
            return Ok(Vec::new());
        }

        let file = fs::File::open(self.path())?;
        let mut entries = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|source| OutboxError::Corrupt {
                line: index + 1,
                source,
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox").field("path", &self.cfg.path).finish()
    }
}

/// Errors produced by the outbox.
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt outbox entry on line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("outbox writer lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_sdk::config::MemoryConfigProvider;
    use serde_json::json;

    fn entry(id: &str) -> OutboxEntry {
        OutboxEntry::new(
            "owner",
            Some("https://hooks.example.com/owner".to_string()),
            json!({ "id": id, "decision": "approve" }),
            "503: upstream unavailable",
            3,
        )
    }

    #[test]
    fn test_append_then_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::at(dir.path().join("nested/outbox.jsonl"));

        outbox.append(&entry("REQ-1")).unwrap();
        outbox.append(&entry("REQ-2")).unwrap();

        let entries = outbox.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].payload["id"], "REQ-1");
        assert_eq!(entries[1].payload["id"], "REQ-2");
        assert_eq!(entries[1].attempts, 3);
        assert_ne!(entries[0].entry_id, entries[1].entry_id);
    }

    #[test]
    fn test_append_never_rewrites_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::at(dir.path().join("outbox.jsonl"));

        outbox.append(&entry("REQ-1")).unwrap();
        let before = fs::read_to_string(outbox.path()).unwrap();
        outbox.append(&entry("REQ-2")).unwrap();
        let after = fs::read_to_string(outbox.path()).unwrap();

        assert!(after.starts_with(&before));
        assert_eq!(after.lines().count(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::at(dir.path().join("absent.jsonl"));
        assert!(outbox.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::at(dir.path().join("outbox.jsonl"));
        outbox.append(&entry("REQ-1")).unwrap();

        let mut file = OpenOptions::new().append(true).open(outbox.path()).unwrap();
        writeln!(file, "not json").unwrap();

        match outbox.read_all().unwrap_err() {
            OutboxError::Corrupt { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = Outbox::at(dir.path());
        assert!(outbox.append(&entry("REQ-1")).is_err());
    }

    #[test]
    fn test_config_disabled_without_path() {
        let mut provider = MemoryConfigProvider::new();
        assert!(OutboxConfig::from_provider(&provider).is_none());

        provider.set("outbox_path", "/tmp/outbox.jsonl");
        let cfg = OutboxConfig::from_provider(&provider).unwrap();
        assert_eq!(cfg.path, PathBuf::from("/tmp/outbox.jsonl"));
    }
}
