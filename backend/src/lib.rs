//! # apload - FBL1N export ingest
//!
//! apload takes a headerless accounts-payable export (`.csv` or `.xlsx`),
//! drops rows without a sociedad, lets the operator exclude clients, and
//! bulk-loads what remains into the `crudo_ap` staging table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV/XLSX   │────▶│   Parser    │────▶│  Transform  │────▶│    Load     │
//! │  (upload)   │     │  (auto-enc) │     │ (a..zz, fx) │     │ (LOAD DATA) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apload::{preview, plan_load, load_into_mysql, Config, ExclusionSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let bytes = std::fs::read("fbl1n.xlsx")?;
//!
//!     let report = preview("fbl1n.xlsx", &bytes)?;
//!     println!("{} rows, clients: {:?}", report.total, report.unique_clients);
//!
//!     let exclusions: ExclusionSet = ["100234"].into_iter().collect();
//!     let plan = plan_load("fbl1n.xlsx", &bytes, &exclusions)?;
//!     let loaded = load_into_mysql(&config.destination, &plan).await?;
//!     println!("{} rows in destination", loaded.outcome.total_final);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment configuration
//! - [`models`] - Domain models (NormalizedRow, ExclusionSet, LoadStep)
//! - [`parser`] - CSV/XLSX decoding with encoding detection
//! - [`transform`] - Column naming, filters, aggregates, and pipeline
//! - [`load`] - Bulk-load encoding and the destination store
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Destination
pub mod load;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, DecodeError, EncodeError, PipelineError, PipelineResult, StoreError,
};

// =============================================================================
// Re-exports - Config & Models
// =============================================================================

pub use config::{Config, DestinationConfig, ServerConfig};

pub use models::{
    ExclusionSet, FilterResult, LoadOutcome, LoadStep, NormalizedRow, NormalizedTable, RawRow,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode, decode_text, detect_encoding, parse_delimited, parse_xlsx, TabularFormat};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    column_name, column_names, exclude_clients, filter_sociedad, normalize, sum_amounts,
    unique_clients,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{plan_load, preview, read_table, LoadPlan, PreviewReport};

// =============================================================================
// Re-exports - Load
// =============================================================================

pub use load::{load_into_mysql, load_plan, run_load, BulkPayload, DestinationStore, LoadReport, MySqlStore};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, LoadResponse, PreviewResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
