//! Domain models for the apload ingest pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RawRow`] - Cells of one decoded line or spreadsheet row
//! - [`NormalizedRow`] - Cells keyed by positional column name
//! - [`NormalizedTable`] - Column-name sequence plus its rows
//! - [`FilterResult`] - Outcome of the sociedad filter
//! - [`ExclusionSet`] - Operator-supplied keys to drop before loading
//! - [`LoadStep`] / [`LoadOutcome`] - Destination load bookkeeping
//!
//! Cell values stay opaque text; numeric or date interpretation happens only in
//! the consumer that needs it.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::transform::columns::column_index;

// =============================================================================
// Rows
// =============================================================================

/// One decoded row, before any header or width interpretation.
pub type RawRow = Vec<String>;

/// Column holding the sociedad (company code).
pub const SOCIEDAD_COLUMN: &str = "a";

/// Column holding the client/vendor key used for exclusion.
pub const CLIENT_COLUMN: &str = "b";

/// Column holding the amount summed in the preview.
pub const AMOUNT_COLUMN: &str = "o";

/// A row keyed by positional column names.
///
/// Always as wide as the widest row of its upload; missing trailing cells are
/// empty strings. Serializes as a JSON object in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    columns: Arc<[String]>,
    cells: Vec<String>,
}

impl NormalizedRow {
    /// `cells` must have exactly one entry per column.
    pub(crate) fn from_parts(columns: Arc<[String]>, cells: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), cells.len());
        Self { columns, cells }
    }

    /// Cell under a column name, `None` if the upload is narrower.
    pub fn get(&self, name: &str) -> Option<&str> {
        column_index(name).and_then(|i| self.cells.get(i)).map(String::as_str)
    }

    /// Cell under a column name, trimmed; absent columns read as "".
    pub fn trimmed(&self, name: &str) -> &str {
        self.get(name).map(str::trim).unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Serialize for NormalizedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, cell) in self.columns.iter().zip(&self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// All rows of one upload plus the column-name sequence they share.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub columns: Arc<[String]>,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    /// Whether the upload is wide enough to carry `name`.
    pub fn has_column(&self, name: &str) -> bool {
        column_index(name).is_some_and(|i| i < self.columns.len())
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Outcome of the sociedad filter.
///
/// Rows are partitioned: `removed + rows.len() == total_original`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    /// Rows before filtering.
    pub total_original: usize,
    /// Rows dropped for a blank sociedad.
    pub removed: usize,
    /// Retained rows, in upload order.
    pub rows: Vec<NormalizedRow>,
}

impl FilterResult {
    /// Number of retained rows.
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trimmed client keys an operator chose to leave out of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `clientesExcluir` JSON array. Blank input means no exclusions.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        let keys: Vec<String> = serde_json::from_str(raw)?;
        Ok(keys.into_iter().collect())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|k| k.as_ref().trim().to_string()).collect())
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Steps of one destination load, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    Connect,
    Truncate,
    BulkLoad,
    Reconcile,
    Purge,
    Finalize,
}

impl fmt::Display for LoadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStep::Connect => "connect",
            LoadStep::Truncate => "truncate",
            LoadStep::BulkLoad => "bulk load",
            LoadStep::Reconcile => "reconcile",
            LoadStep::Purge => "purge",
            LoadStep::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// Destination counts after a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Rows found with the invalid-date sentinel, and purged.
    pub inconsistent: u64,
    /// Rows left in the table after the purge.
    pub total_final: u64,
}
