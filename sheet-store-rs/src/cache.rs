//! Time-bounded cache of loaded tables
//!
//! Entries expire `ttl` after they were loaded. Expiry uses tokio's clock so
//! that tests can drive it with a paused runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::StoreResult;
use crate::source::TableSource;
use crate::table::Table;

/// Default time-to-live for cached tables
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Identifies one worksheet of one spreadsheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetKey {
    pub spreadsheet_id: String,
    pub worksheet: String,
}

impl SheetKey {
    pub fn new(spreadsheet_id: impl Into<String>, worksheet: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
        }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spreadsheet_id, self.worksheet)
    }
}

struct CachedTable {
    table: Arc<Table>,
    expires_at: Instant,
}

/// Shared cache of tables keyed by sheet
pub struct TableCache {
    ttl: Duration,
    entries: RwLock<HashMap<SheetKey, CachedTable>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached table for `key`, if present and not expired
    pub async fn get(&self, key: &SheetKey) -> Option<Arc<Table>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| Arc::clone(&entry.table))
    }

    /// Store `table` for `key`, replacing any previous entry
    pub async fn insert(&self, key: SheetKey, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        let entry = CachedTable {
            table: Arc::clone(&table),
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
        table
    }

    /// Drop the entry for `key`; returns whether one existed
    pub async fn invalidate(&self, key: &SheetKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// The cached table for `key`, loading it from `source` when absent or stale
    pub async fn get_or_load<S>(&self, key: &SheetKey, source: &S) -> StoreResult<Arc<Table>>
    where
        S: TableSource + ?Sized,
    {
        if let Some(table) = self.get(key).await {
            debug!("Table cache hit for {}", key);
            return Ok(table);
        }

        debug!("Table cache miss for {}; loading from {}", key, source.name());
        let table = source.load(key).await?;
        Ok(self.insert(key.clone(), table).await)
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl fmt::Debug for TableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableCache").field("ttl", &self.ttl).finish()
    }
}
