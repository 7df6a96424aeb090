//! High-level pipeline API: preview an upload, or plan its load.
//!
//! Both paths share the same front half:
//!
//! ```text
//! bytes ─▶ decode ─▶ normalize ─▶ sociedad filter ─┬─▶ unique clients + amount total   (preview)
//!                                                  └─▶ exclusions ─▶ LoadPlan          (load)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use apload::transform::pipeline::preview;
//!
//! let bytes = std::fs::read("fbl1n.csv")?;
//! let report = preview("fbl1n.csv", &bytes)?;
//! println!("{} rows, {} clients", report.total, report.unique_clients.len());
//! ```

use std::sync::Arc;

use super::aggregate::{sum_amounts, unique_clients};
use super::filter::{exclude_clients, filter_sociedad};
use super::normalize::normalize;
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{ExclusionSet, FilterResult, NormalizedRow, NormalizedTable, AMOUNT_COLUMN};
use crate::parser::{decode, TabularFormat};

/// Retained rows returned in a preview.
pub const PREVIEW_ROWS: usize = 100;

/// What the operator sees before choosing exclusions.
#[derive(Debug, Clone)]
pub struct PreviewReport {
    /// Every row was dropped by the sociedad filter.
    pub empty_after_filter: bool,
    /// Rows dropped for a blank sociedad.
    pub removed: usize,
    /// Rows retained by the sociedad filter.
    pub total: usize,
    /// First [`PREVIEW_ROWS`] retained rows.
    pub rows: Vec<NormalizedRow>,
    /// Exclusion candidates.
    pub unique_clients: Vec<String>,
    /// Sum of the amount column over retained rows.
    pub amount_total: f64,
    /// Full column-name sequence of the upload.
    pub columns: Vec<String>,
    /// Whether the upload is wide enough to carry the amount column.
    pub has_amount_column: bool,
}

/// Rows ready for the bulk load.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Full column-name sequence of the upload.
    pub columns: Arc<[String]>,
    /// Rows that survived both filters.
    pub rows: Vec<NormalizedRow>,
    /// Rows dropped for a blank sociedad.
    pub removed_sociedad: usize,
    /// Rows dropped by the exclusion set.
    pub excluded: usize,
}

/// Decode and normalize an upload, picking the format from its file name.
pub fn read_table(file_name: &str, bytes: &[u8]) -> PipelineResult<NormalizedTable> {
    let format = TabularFormat::from_file_name(file_name)?;

    log_info(format!("📖 Reading {} ({:?}, {} bytes)...", file_name, format, bytes.len()));
    let raw = decode(bytes, format)?;
    log_success(format!("Read {} rows", raw.len()));

    let table = normalize(raw);
    match table.columns.last() {
        Some(last) => log_success(format!("{} columns (a..{})", table.columns.len(), last)),
        None => log_warning("No columns found"),
    }
    Ok(table)
}

/// Preview path: filter, then compute the pick list and amount total.
///
/// An upload left empty by the sociedad filter is not an error here; the
/// report comes back with `empty_after_filter` set.
pub fn preview(file_name: &str, bytes: &[u8]) -> PipelineResult<PreviewReport> {
    let table = read_table(file_name, bytes)?;
    let has_amount_column = table.has_column(AMOUNT_COLUMN);
    let columns = table.columns.to_vec();

    let filtered = run_sociedad_filter(table.rows);
    if filtered.is_empty() {
        log_warning("Every row lacks a sociedad: nothing left to preview");
        return Ok(PreviewReport {
            empty_after_filter: true,
            removed: filtered.removed,
            total: 0,
            rows: Vec::new(),
            unique_clients: Vec::new(),
            amount_total: 0.0,
            columns,
            has_amount_column,
        });
    }

    let clients = unique_clients(&filtered.rows);
    log_success(format!("{} distinct clients", clients.len()));

    let amount_total = sum_amounts(&filtered.rows);
    if has_amount_column {
        log_success(format!("Column o total: {:.2}", amount_total));
    } else {
        log_warning("Column o not present: amount total not meaningful");
    }

    let total = filtered.total();
    let mut rows = filtered.rows;
    rows.truncate(PREVIEW_ROWS);

    Ok(PreviewReport {
        empty_after_filter: false,
        removed: filtered.removed,
        total,
        rows,
        unique_clients: clients,
        amount_total,
        columns,
        has_amount_column,
    })
}

/// Load path, in memory: filter, apply exclusions, and refuse empty results.
pub fn plan_load(file_name: &str, bytes: &[u8], exclusions: &ExclusionSet) -> PipelineResult<LoadPlan> {
    let table = read_table(file_name, bytes)?;

    let filtered = run_sociedad_filter(table.rows);
    if filtered.is_empty() {
        return Err(PipelineError::EmptyAfterFilter {
            removed: filtered.removed,
        });
    }

    let retained = filtered.total();
    let rows = exclude_clients(filtered.rows, exclusions);
    let excluded = retained - rows.len();
    if !exclusions.is_empty() {
        log_info(format!(
            "Excluding {} client(s): {} rows dropped",
            exclusions.len(),
            excluded
        ));
    }

    if rows.is_empty() {
        return Err(PipelineError::NoRowsToLoad);
    }
    log_success(format!("{} rows ready to load", rows.len()));

    Ok(LoadPlan {
        columns: table.columns,
        rows,
        removed_sociedad: filtered.removed,
        excluded,
    })
}

fn run_sociedad_filter(rows: Vec<NormalizedRow>) -> FilterResult {
    log_info("🔎 Dropping rows without sociedad (column a)...");
    let filtered = filter_sociedad(rows);
    if filtered.removed > 0 {
        log_warning(format!(
            "{} of {} rows had no sociedad",
            filtered.removed, filtered.total_original
        ));
    }
    log_success(format!("{} rows retained", filtered.total()));
    filtered
}
