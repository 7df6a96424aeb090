//! Error types for the apload ingest pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`DecodeError`] - Upload decoding errors (format, encoding, spreadsheet)
//! - [`EncodeError`] - Bulk-load payload serialization errors
//! - [`StoreError`] - Destination store failures, tagged with the load step
//! - [`ConfigError`] - Process configuration errors
//! - [`PipelineError`] - Top-level preview/load errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

use crate::models::LoadStep;

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while turning uploaded bytes into raw rows.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// File name extension is neither `.csv` nor `.xlsx`.
    #[error("Formato no soportado: {0}")]
    UnsupportedFormat(String),

    /// Failed to read the upload.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The spreadsheet container could not be read.
    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),

    /// The workbook has no worksheet at all.
    #[error("Spreadsheet has no sheets")]
    EmptySpreadsheet,
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors while writing the bulk-load payload.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Temporary payload file error.
    #[error("Payload IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Store Errors
// =============================================================================

/// A destination store failure, tagged with the step it interrupted.
///
/// Nothing is rolled back: a failure after [`LoadStep::Truncate`] leaves the
/// destination table truncated or partially reconciled.
#[derive(Debug, Error)]
#[error("{step} failed: {message}")]
pub struct StoreError {
    pub step: LoadStep,
    pub message: String,
}

impl StoreError {
    pub fn new(step: LoadStep, source: impl std::fmt::Display) -> Self {
        Self {
            step,
            message: source.to_string(),
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable did not parse.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level preview/load errors.
///
/// Recoverable, user-facing conditions ([`PipelineError::EmptyAfterFilter`],
/// [`PipelineError::NoRowsToLoad`], [`PipelineError::InvalidExclusions`] and
/// unreadable uploads) are client errors. Store, encode and IO failures are
/// fatal for the request. See [`PipelineError::is_client_error`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Upload decoding error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Every row was dropped by the sociedad filter.
    #[error("Luego de eliminar filas sin Sociedad, el archivo quedó vacío. Revisá el archivo de origen.")]
    EmptyAfterFilter { removed: usize },

    /// Every row was dropped by the exclusion filter.
    #[error("No hay filas válidas para cargar (quedó vacío luego de filtros/exclusiones).")]
    NoRowsToLoad,

    /// The exclusion list is not a JSON array of strings.
    #[error("clientesExcluir inválido: {0}")]
    InvalidExclusions(String),

    /// Bulk-load payload error.
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Destination store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// True when the caller sent something we refuse to process.
    pub fn is_client_error(&self) -> bool {
        match self {
            PipelineError::Decode(DecodeError::Io(_)) => false,
            PipelineError::Decode(_) => true,
            PipelineError::EmptyAfterFilter { .. }
            | PipelineError::NoRowsToLoad
            | PipelineError::InvalidExclusions(_) => true,
            PipelineError::Encode(_) | PipelineError::Store(_) => false,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
