//! Table sources
//!
//! A `TableSource` loads the whole worksheet for a `SheetKey`. Three sources
//! exist: the live Sheets values API, JSON documents on disk, and in-process
//! tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::debug;
use relay_sdk::sheets::ValueRange;
use relay_sdk::ValuesReader;

use crate::cache::SheetKey;
use crate::errors::{StoreError, StoreResult};
use crate::table::Table;

/// Loads tables by sheet key
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Load the full table for `key`
    async fn load(&self, key: &SheetKey) -> StoreResult<Table>;
}

/// Reads worksheets through a `ValuesReader`, normally the Sheets client
pub struct SheetsApiSource {
    reader: Arc<dyn ValuesReader>,
}

impl SheetsApiSource {
    pub fn new(reader: Arc<dyn ValuesReader>) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl TableSource for SheetsApiSource {
    fn name(&self) -> &str {
        "sheets_api"
    }

    async fn load(&self, key: &SheetKey) -> StoreResult<Table> {
        let range = self
            .reader
            .read_values(&key.spreadsheet_id, &key.worksheet)
            .await?;
        let table = Table::from_value_range(&range);
        debug!("Loaded {} rows from {}", table.len(), key);
        Ok(table)
    }
}

/// Reads values-range JSON documents from `{root}/{spreadsheet_id}/{worksheet}.json`
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    root: PathBuf,
}

impl JsonFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the document backing `key`
    pub fn path_for(&self, key: &SheetKey) -> PathBuf {
        self.root
            .join(&key.spreadsheet_id)
            .join(format!("{}.json", key.worksheet))
    }

    async fn read_document(path: &Path) -> StoreResult<ValueRange> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        serde_json::from_str(&text)
            .map_err(|e| StoreError::Malformed(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl TableSource for JsonFileSource {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn load(&self, key: &SheetKey) -> StoreResult<Table> {
        let path = self.path_for(key);
        let range = Self::read_document(&path).await?;
        Ok(Table::from_value_range(&range))
    }
}

/// In-process tables; counts loads so callers can observe caching
#[derive(Default)]
pub struct MemorySource {
    tables: RwLock<HashMap<SheetKey, Table>>,
    loads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, builder style
    pub fn with_table(self, key: SheetKey, table: Table) -> Self {
        self.insert(key, table);
        self
    }

    /// Add or replace the table for `key`
    pub fn insert(&self, key: SheetKey, table: Table) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.insert(key, table);
    }

    /// Number of `load` calls served so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &SheetKey) -> StoreResult<Table> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSheet(key.to_string()))
    }
}
