//! Bulk-load payload: headerless CSV with every cell quoted.
//!
//! Matches the destination's `FIELDS TERMINATED BY ',' ENCLOSED BY '"'
//! ESCAPED BY '"' LINES TERMINATED BY '\n'`.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::EncodeError;
use crate::models::NormalizedRow;

/// Serialize rows, one per line, cells in column order.
///
/// Every cell is wrapped in `"` with inner quotes doubled. Each line ends in
/// `\n`, including the last.
pub fn encode_rows(rows: &[NormalizedRow]) -> Result<Vec<u8>, EncodeError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .double_quote(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(row.cells())?;
    }

    writer.into_inner().map_err(|e| EncodeError::Io(e.into_error()))
}

/// An encoded payload on disk, deleted when dropped.
#[derive(Debug)]
pub struct BulkPayload {
    file: NamedTempFile,
    rows: usize,
    bytes: usize,
}

impl BulkPayload {
    /// Encode rows into a fresh temporary file.
    pub fn write(rows: &[NormalizedRow]) -> Result<Self, EncodeError> {
        let encoded = encode_rows(rows)?;

        let mut file = tempfile::Builder::new()
            .prefix("fbl1n_")
            .suffix(".csv")
            .tempfile()?;
        file.write_all(&encoded)?;
        file.flush()?;

        Ok(Self {
            file,
            rows: rows.len(),
            bytes: encoded.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of encoded rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}
