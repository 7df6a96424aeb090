//! Destination store port.

use async_trait::async_trait;

use super::encoder::BulkPayload;

/// A destination table that can be truncated, bulk-loaded and reconciled.
///
/// Every method is one statement against the table; nothing is transactional
/// across calls.
#[async_trait]
pub trait DestinationStore: Send {
    type Error: std::fmt::Display + Send;

    /// Remove every row.
    async fn truncate(&mut self) -> Result<(), Self::Error>;

    /// Ingest an encoded payload with the store's native bulk facility.
    async fn bulk_load(&mut self, payload: &BulkPayload) -> Result<(), Self::Error>;

    /// Rows whose date column holds the invalid-date sentinel.
    async fn count_invalid_dates(&mut self) -> Result<u64, Self::Error>;

    /// Delete the rows [`DestinationStore::count_invalid_dates`] counts.
    async fn purge_invalid_dates(&mut self) -> Result<(), Self::Error>;

    /// Rows currently in the table.
    async fn count_rows(&mut self) -> Result<u64, Self::Error>;
}
