//! Preview aggregates over retained rows: the client pick list and the amount total.

use feruca::{Collator, Locale, Tailoring};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{NormalizedRow, AMOUNT_COLUMN, CLIENT_COLUMN};

/// Distinct trimmed, non-blank client keys (column `b`), sorted for display.
///
/// Deduplication is exact and case-sensitive; ordering follows [`locale_cmp`].
pub fn unique_clients(rows: &[NormalizedRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out: Vec<String> = rows
        .iter()
        .map(|r| r.trimmed(CLIENT_COLUMN))
        .filter(|key| !key.is_empty() && seen.insert(*key))
        .map(str::to_string)
        .collect();

    let mut collator = root_collator();
    out.sort_by(|a, b| collator.collate(a, b));
    out
}

/// Sum of the amount column (`o`) across rows.
///
/// Rows narrower than 15 columns contribute nothing, so a total of 0 does not
/// prove the column exists; check [`NormalizedTable::has_column`] for that.
///
/// [`NormalizedTable::has_column`]: crate::models::NormalizedTable::has_column
pub fn sum_amounts(rows: &[NormalizedRow]) -> f64 {
    rows.iter().map(|r| parse_amount(r.trimmed(AMOUNT_COLUMN))).sum()
}

/// Lenient amount parsing: blank or unparsable cells count as 0.
///
/// The first `,` is read as the decimal separator.
pub fn parse_amount(cell: &str) -> f64 {
    let cell = cell.trim();
    if cell.is_empty() {
        return 0.0;
    }
    cell.replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Locale-aware ordering: Unicode collation with the CLDR root order.
///
/// Punctuation and symbols sort before digits, digits before letters.
/// Accents are compared before case, and lowercase sorts before uppercase.
/// Byte order breaks any remaining tie so the order is total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    root_collator().collate(a, b)
}

fn root_collator() -> Collator {
    // Non-ignorable: punctuation keeps its own weight instead of being skipped
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}
