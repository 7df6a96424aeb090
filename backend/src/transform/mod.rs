//! Transformation module.
//!
//! This module turns decoded rows into what the preview and load paths need:
//! - Columns: Positional column names
//! - Normalize: Raw rows to name-keyed rows
//! - Filter: Sociedad filter and client exclusions
//! - Aggregate: Client pick list and amount total
//! - Pipeline: Preview and load-plan entry points

pub mod aggregate;
pub mod columns;
pub mod filter;
pub mod normalize;
pub mod pipeline;

pub use aggregate::{locale_cmp, parse_amount, sum_amounts, unique_clients};
pub use columns::{column_index, column_name, column_names};
pub use filter::{exclude_clients, filter_sociedad};
pub use normalize::normalize;
pub use pipeline::*;
