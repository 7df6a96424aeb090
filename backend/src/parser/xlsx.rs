//! Spreadsheet intake: first worksheet of an `.xlsx`, every cell as text.

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use crate::error::{DecodeError, DecodeResult};
use crate::models::RawRow;

/// Read the first worksheet in row-major order.
///
/// Rows are anchored at column A even when the used range starts further
/// right. Trailing empty cells are dropped, and rows left with no cells are
/// dropped entirely.
pub fn parse_xlsx(bytes: &[u8]) -> DecodeResult<Vec<RawRow>> {
    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes))
        .map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(DecodeError::EmptySpreadsheet)?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| DecodeError::Spreadsheet(e.to_string()))?;

    let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let rows = range
        .rows()
        .filter_map(|cells| {
            let used = cells
                .iter()
                .rposition(|c| !matches!(c, Data::Empty))
                .map(|last| last + 1)?;

            let mut row = Vec::with_capacity(col_offset + used);
            row.resize(col_offset, String::new());
            row.extend(cells[..used].iter().map(cell_to_string));
            Some(row)
        })
        .collect();

    Ok(rows)
}

/// Coerce a cell to the text an operator sees.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.time() == chrono::NaiveTime::MIN => ts.format("%Y-%m-%d").to_string(),
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn cells(row: &[String]) -> Vec<&str> {
        row.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_reads_first_sheet_as_text() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "1000").unwrap();
        sheet.write_string(0, 1, "ACME").unwrap();
        sheet.write_number(0, 2, 12.5).unwrap();
        sheet.write_number(1, 0, 2000.0).unwrap();
        sheet.write_string(1, 1, "Globex").unwrap();
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = parse_xlsx(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(cells(&rows[0]), vec!["1000", "ACME", "12.5"]);
        assert_eq!(cells(&rows[1]), vec!["2000", "Globex"]);
    }

    #[test]
    fn test_blank_rows_dropped() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "a").unwrap();
        sheet.write_string(2, 0, "c").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = parse_xlsx(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(cells(&rows[1]), vec!["c"]);
    }

    #[test]
    fn test_rows_anchored_at_column_a() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "ACME").unwrap();
        sheet.write_string(0, 2, "x").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = parse_xlsx(&bytes).unwrap();
        assert_eq!(cells(&rows[0]), vec!["", "ACME", "x"]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = parse_xlsx(b"not a zip archive").unwrap_err();
        assert!(matches!(err, DecodeError::Spreadsheet(_)));
    }

    #[test]
    fn test_date_cells_as_iso_dates() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_only = Format::new().set_num_format("yyyy-mm-dd");
        let date_time = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        let posted = ExcelDateTime::parse_from_str("2024-01-31").unwrap();
        let stamped = ExcelDateTime::parse_from_str("2024-02-29 12:00:00").unwrap();
        sheet.write_string(0, 0, "1000").unwrap();
        sheet.write_datetime_with_format(0, 1, &posted, &date_only).unwrap();
        sheet.write_datetime_with_format(0, 2, &stamped, &date_time).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = parse_xlsx(&bytes).unwrap();
        assert_eq!(cells(&rows[0]), vec!["1000", "2024-01-31", "2024-02-29 12:00:00"]);
    }

    #[test]
    fn test_iso_and_error_cells() {
        assert_eq!(
            cell_to_string(&Data::DateTimeIso("2024-01-31T08:15:00".into())),
            "2024-01-31T08:15:00"
        );
        assert_eq!(cell_to_string(&Data::DurationIso("PT1H".into())), "PT1H");
        assert_eq!(cell_to_string(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
        assert_eq!(cell_to_string(&Data::Error(CellErrorType::NA)), "#N/A");
    }

    #[test]
    fn test_cell_coercion() {
        assert_eq!(cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(cell_to_string(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_to_string(&Data::Int(-3)), "-3");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String(" keep ".into())), " keep ");
    }
}
