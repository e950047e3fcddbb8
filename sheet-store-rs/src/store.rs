//! Cached, typed access to one worksheet

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::cache::{SheetKey, TableCache};
use crate::columns::ColumnNames;
use crate::errors::StoreResult;
use crate::lookup::find_record;
use crate::record::RequestRecord;
use crate::source::TableSource;
use crate::table::Table;

/// Request table for one sheet, loaded through a source and cached
pub struct SheetStore {
    source: Arc<dyn TableSource>,
    cache: TableCache,
    key: SheetKey,
    columns: ColumnNames,
}

impl SheetStore {
    pub fn new(source: Arc<dyn TableSource>, key: SheetKey, ttl: Duration) -> Self {
        Self {
            source,
            cache: TableCache::new(ttl),
            key,
            columns: ColumnNames::default(),
        }
    }

    /// Replace the logical column candidates
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    pub fn key(&self) -> &SheetKey {
        &self.key
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// The current table, served from cache while fresh
    pub async fn table(&self) -> StoreResult<Arc<Table>> {
        self.cache.get_or_load(&self.key, self.source.as_ref()).await
    }

    /// Look up a record, using the cached table when fresh
    pub async fn lookup(&self, id: &str) -> StoreResult<Option<RequestRecord>> {
        let table = self.table().await?;
        let record = find_record(&table, &self.columns, id)?;
        debug!(
            "Lookup of '{}' in {}: {}",
            id.trim(),
            self.key,
            if record.is_some() { "found" } else { "not found" }
        );
        Ok(record)
    }

    /// Drop the cached table, then look up
    pub async fn lookup_fresh(&self, id: &str) -> StoreResult<Option<RequestRecord>> {
        self.invalidate().await;
        self.lookup(id).await
    }

    /// Drop the cached table for this sheet
    pub async fn invalidate(&self) {
        if self.cache.invalidate(&self.key).await {
            info!("Invalidated cached table for {}", self.key);
        }
    }
}

impl std::fmt::Debug for SheetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetStore")
            .field("source", &self.source.name())
            .field("key", &self.key)
            .field("cache", &self.cache)
            .finish()
    }
}
