//! Headerless tabular decoding.
//!
//! Turns uploaded bytes into [`RawRow`]s. No header interpretation happens here:
//! every decoded line or spreadsheet row is data.
//!
//! The delimited-text dialect is deliberately narrow: comma separated, `"` as
//! the quote character, `""` inside a quoted field for a literal quote, and
//! **one record per physical line**. A quoted field never spans lines.

mod xlsx;

use crate::error::{DecodeError, DecodeResult};
use crate::models::RawRow;

pub use xlsx::parse_xlsx;

/// Upload formats, discriminated by file name extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Xlsx,
}

impl TabularFormat {
    /// Pick the format from a file name (case-insensitive extension).
    ///
    /// # Example
    /// ```ignore
    /// assert_eq!(TabularFormat::from_file_name("FBL1N.CSV")?, TabularFormat::Csv);
    /// assert!(TabularFormat::from_file_name("notes.txt").is_err());
    /// ```
    pub fn from_file_name(file_name: &str) -> DecodeResult<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".csv") {
            Ok(TabularFormat::Csv)
        } else if lower.ends_with(".xlsx") {
            Ok(TabularFormat::Xlsx)
        } else {
            Err(DecodeError::UnsupportedFormat(file_name.to_string()))
        }
    }
}

/// Decode an upload into raw rows. Blank lines and empty rows are dropped.
pub fn decode(bytes: &[u8], format: TabularFormat) -> DecodeResult<Vec<RawRow>> {
    match format {
        TabularFormat::Csv => {
            let (text, _) = decode_text(bytes);
            Ok(parse_delimited(&text))
        }
        TabularFormat::Xlsx => parse_xlsx(bytes),
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode text bytes, returning the text and the encoding used.
///
/// Valid UTF-8 is taken as is; anything else goes through charset detection.
pub fn decode_text(bytes: &[u8]) -> (String, String) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "utf-8".to_string());
    }

    let encoding = detect_encoding(bytes);
    let text = decode_as(bytes, &encoding);
    (text, encoding)
}

/// Decode with a normalized encoding name from [`detect_encoding`].
///
/// The Latin-1 label decodes as Windows-1252, its WHATWG superset.
fn decode_as(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        "iso-8859-1" | "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Split text into physical lines and parse each one.
///
/// Lines end at `\n`, with one `\r` before it stripped. Zero-length lines are
/// dropped; a line of spaces is kept as a one-cell row.
pub fn parse_delimited(text: &str) -> Vec<RawRow> {
    text.split_inclusive('\n')
        .map(|segment| match segment.strip_suffix('\n') {
            Some(line) => line.strip_suffix('\r').unwrap_or(line),
            None => segment,
        })
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

/// Parse one physical line into cells.
///
/// Quotes toggle quoted mode and are not kept. Inside a quoted field `""`
/// yields one literal `"`. A quote left open runs to the end of the line.
pub fn parse_line(line: &str) -> RawRow {
    let mut row = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cur.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    row.push(cur);
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[String]) -> Vec<&str> {
        row.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TabularFormat::from_file_name("export.csv").unwrap(), TabularFormat::Csv);
        assert_eq!(TabularFormat::from_file_name("EXPORT.CSV").unwrap(), TabularFormat::Csv);
        assert_eq!(TabularFormat::from_file_name("fbl1n.xlsx").unwrap(), TabularFormat::Xlsx);
        assert!(matches!(
            TabularFormat::from_file_name("fbl1n.xls"),
            Err(DecodeError::UnsupportedFormat(_))
        ));
        assert!(TabularFormat::from_file_name("csv").is_err());
        assert!(TabularFormat::from_file_name("").is_err());
    }

    #[test]
    fn test_simple_line() {
        assert_eq!(cells(&parse_line("1000,ACME,12,50")), vec!["1000", "ACME", "12", "50"]);
    }

    #[test]
    fn test_quoted_delimiter() {
        assert_eq!(cells(&parse_line(r#""12,50",x"#)), vec!["12,50", "x"]);
    }

    #[test]
    fn test_doubled_quote_inside_quotes() {
        assert_eq!(cells(&parse_line(r#""say ""hi""",b"#)), vec![r#"say "hi""#, "b"]);
        assert_eq!(cells(&parse_line(r#""""""#)), vec![r#"""#]);
    }

    #[test]
    fn test_empty_quoted_field_is_empty() {
        assert_eq!(cells(&parse_line(r#""","x","""#)), vec!["", "x", ""]);
    }

    #[test]
    fn test_empty_cells_kept() {
        assert_eq!(cells(&parse_line(",,")), vec!["", "", ""]);
        assert_eq!(cells(&parse_line("a,")), vec!["a", ""]);
    }

    #[test]
    fn test_whitespace_not_trimmed() {
        assert_eq!(cells(&parse_line(" a , b ")), vec![" a ", " b "]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end_of_line() {
        assert_eq!(cells(&parse_line(r#"a,"b,c"#)), vec!["a", "b,c"]);
    }

    #[test]
    fn test_quoted_field_does_not_span_lines() {
        let rows = parse_delimited("a,\"b\nc\",d\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(cells(&rows[0]), vec!["a", "b"]);
        assert_eq!(cells(&rows[1]), vec!["c,d"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let rows = parse_delimited("a,b\r\n\r\n\nc,d\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(cells(&rows[1]), vec!["c", "d"]);
    }

    #[test]
    fn test_space_only_line_kept() {
        let rows = parse_delimited("a\n   \nb");
        assert_eq!(rows.len(), 3);
        assert_eq!(cells(&rows[1]), vec!["   "]);
    }

    #[test]
    fn test_lone_carriage_return_on_last_line_kept() {
        let rows = parse_delimited("a,b\nc\r");
        assert_eq!(cells(&rows[1]), vec!["c\r"]);
    }

    #[test]
    fn test_decode_utf8_untouched() {
        let (text, encoding) = decode_text("Sociedad,Año".as_bytes());
        assert_eq!(text, "Sociedad,Año");
        assert_eq!(encoding, "utf-8");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Compañía" in ISO-8859-1
        let bytes: &[u8] = &[0x43, 0x6F, 0x6D, 0x70, 0x61, 0xF1, 0xED, 0x61];
        let (text, _) = decode_text(bytes);
        assert!(text.starts_with("Compa"));
        assert_eq!(parse_delimited(&text).len(), 1);
    }

    #[test]
    fn test_latin1_high_bytes_keep_their_characters() {
        // ´ ¤ ¼ ½ ¾ differ between Latin-1 and Latin-9
        let bytes: &[u8] = &[0xB4, 0xA4, 0xBC, 0xBD, 0xBE, 0xF1];
        assert_eq!(decode_as(bytes, "iso-8859-1"), "´¤¼½¾ñ");
        assert_eq!(decode_as(&[0x80], "windows-1252"), "€");
    }

    #[test]
    fn test_decode_csv_rows() {
        let rows = decode(b"1,X\n,Y\n", TabularFormat::Csv).unwrap();
        assert_eq!(rows, vec![vec!["1".to_string(), "X".to_string()], vec!["".to_string(), "Y".to_string()]]);
    }
}
