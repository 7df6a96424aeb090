//! Row filters: the sociedad filter and the operator's client exclusions.

use crate::models::{ExclusionSet, FilterResult, NormalizedRow, CLIENT_COLUMN, SOCIEDAD_COLUMN};

/// Keep rows whose sociedad (column `a`) is non-blank after trimming.
pub fn filter_sociedad(rows: Vec<NormalizedRow>) -> FilterResult {
    let total_original = rows.len();
    let rows: Vec<NormalizedRow> = rows
        .into_iter()
        .filter(|r| !r.trimmed(SOCIEDAD_COLUMN).is_empty())
        .collect();

    FilterResult {
        total_original,
        removed: total_original - rows.len(),
        rows,
    }
}

/// Drop rows whose trimmed client key (column `b`) is in `excluded`.
///
/// Rows with a blank key are never excluded.
pub fn exclude_clients(rows: Vec<NormalizedRow>, excluded: &ExclusionSet) -> Vec<NormalizedRow> {
    if excluded.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| {
            let key = r.trimmed(CLIENT_COLUMN);
            key.is_empty() || !excluded.contains(key)
        })
        .collect()
}
