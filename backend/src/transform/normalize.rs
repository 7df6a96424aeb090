//! Raw rows → rows keyed by positional column name.

use std::sync::Arc;

use super::columns::column_names;
use crate::models::{NormalizedRow, NormalizedTable, RawRow};

/// Key every raw row by the column names of the widest row.
///
/// Shorter rows are padded with empty cells. Nothing is trimmed here.
pub fn normalize(raw_rows: Vec<RawRow>) -> NormalizedTable {
    let width = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
    let columns: Arc<[String]> = column_names(width).into();

    let rows = raw_rows
        .into_iter()
        .map(|mut cells| {
            cells.resize(width, String::new());
            NormalizedRow::from_parts(Arc::clone(&columns), cells)
        })
        .collect();

    NormalizedTable { columns, rows }
}
