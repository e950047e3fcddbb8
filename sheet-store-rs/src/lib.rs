//! # Sheet Store
//!
//! Read-only access to the shared request table.
//!
//! - `Table`: header plus text rows, with case-insensitive column resolution
//! - `ColumnNames` / `ColumnMap`: logical columns and their resolved indexes
//! - `RequestRecord`: typed row
//! - `TableSource`: Sheets API, JSON file and in-memory sources
//! - `TableCache`: TTL cache keyed by `SheetKey`
//! - `SheetStore`: cached lookups by tracking identifier

pub mod cache;
pub mod columns;
pub mod errors;
pub mod lookup;
pub mod record;
pub mod source;
pub mod store;
pub mod table;

pub use cache::{SheetKey, TableCache, DEFAULT_CACHE_TTL};
pub use columns::{ColumnMap, ColumnNames};
pub use errors::{StoreError, StoreResult};
pub use lookup::{find_record, find_row};
pub use record::RequestRecord;
pub use source::{JsonFileSource, MemorySource, SheetsApiSource, TableSource};
pub use store::SheetStore;
pub use table::Table;

#[cfg(test)]
mod tests;
