//! Record lookup by tracking identifier

use crate::columns::{ColumnMap, ColumnNames};
use crate::errors::StoreResult;
use crate::record::RequestRecord;
use crate::table::{normalize, Table};

/// Index of the first row whose identifier matches `target`
///
/// Comparison trims both sides and ignores case. A blank target never matches.
pub fn find_row(table: &Table, id_column: usize, target: &str) -> Option<usize> {
    let target = normalize(target);
    if target.is_empty() {
        return None;
    }

    (0..table.len()).find(|&row| normalize(table.cell(row, id_column)) == target)
}

/// Find the record for `target`, resolving columns against the table header
///
/// Returns `Ok(None)` when no row matches and an error when the table lacks
/// an identifier or state column.
pub fn find_record(
    table: &Table,
    names: &ColumnNames,
    target: &str,
) -> StoreResult<Option<RequestRecord>> {
    let columns = ColumnMap::resolve(table, names)?;
    Ok(find_row(table, columns.id, target).map(|row| RequestRecord::from_row(table, row, &columns)))
}
