mod source_tests;

use crate::table::Table;

/// Table with the column layout used across tests
pub(crate) fn request_table(rows: &[[&str; 4]]) -> Table {
    let mut all = vec![vec![
        "Request_ID".to_string(),
        "STATE".to_string(),
        "Authorize".to_string(),
        "Reason".to_string(),
    ]];
    all.extend(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect()),
    );
    Table::from_rows(all)
}
