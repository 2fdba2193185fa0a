//! CSV to [`Table`] parser with encoding and delimiter auto-detection.
//!
//! Metadata sheets come out of Excel and Google Sheets in many shapes: UTF-8
//! with or without BOM, EUC-KR, Windows-1252, comma or semicolon separated.
//! No MEC-specific logic here.

use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::field::{Cell, Row, Table};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    if bytes.starts_with(UTF8_BOM) {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "euc-kr" | "cp949" | "uhc" => "euc-kr".to_string(),
        "shift_jis" | "sjis" | "cp932" => "shift_jis".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(CsvError::Encoding(other.to_string()));
                }
                text.to_string()
            }
            // Fallback: try UTF-8 with lossy conversion
            None => String::from_utf8_lossy(bytes).to_string(),
        },
    };

    Ok(decoded)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into a [`Table`] with an explicit delimiter.
///
/// Quoted fields may contain the delimiter and newlines. Short rows are
/// padded with nulls, extra cells are ignored and blank lines are skipped.
///
/// # Example
/// ```
/// use mecgen::parser::parse_table;
///
/// let table = parse_table("Title,Summary190\n\"Hello, World\",Hi", ',').unwrap();
///
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.rows()[0].text("Title"), "Hello, World");
/// ```
pub fn parse_table(content: &str, delimiter: char) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter = u8::try_from(delimiter).map_err(|_| CsvError::Parse {
        line: 1,
        message: format!("Unsupported delimiter '{}'", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut table = Table::new(headers.clone());

    for record in reader.records() {
        let record = record?;

        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let row = Row::from_pairs(headers.iter().enumerate().map(|(i, header)| {
            let cell = record.get(i).map(Cell::from_raw).unwrap_or(Cell::Null);
            (header.clone(), cell)
        }));
        table.push_row(row);
    }

    Ok(table)
}

/// Parse CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("/path/to/metadata.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Rows: {}", result.table.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    // Detect encoding
    let encoding = detect_encoding(bytes);

    // Decode content
    let content = decode_content(bytes, &encoding)?;

    // Detect delimiter
    let delimiter = detect_delimiter(&content);

    // Parse with detected settings
    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> CsvResult<ParseResult> {
    let table = parse_table(content, delimiter)?;
    let headers = table.headers().to_vec();

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "ContentID,Language\nC1,en-US\nC1,ko-KR";
        let table = parse_table(csv, ',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.headers(), &["ContentID".to_string(), "Language".to_string()]);
        assert_eq!(table.rows()[0].text("Language"), "en-US");
        assert_eq!(table.rows()[1].text("Language"), "ko-KR");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "a;b;c\n1;2;3";
        let table = parse_table(csv, ';').unwrap();

        assert_eq!(table.rows()[0].text("a"), "1");
        assert_eq!(table.rows()[0].text("b"), "2");
        assert_eq!(table.rows()[0].text("c"), "3");
    }

    #[test]
    fn test_quoted_values_with_delimiter_and_newline() {
        let csv = "Title,Summary400\n\"Mother, 2009\",\"Line one\nLine two\"";
        let table = parse_table(csv, ',').unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].text("Title"), "Mother, 2009");
        assert_eq!(table.rows()[0].text("Summary400"), "Line one\nLine two");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n,\n3,4\n";
        let table = parse_table(csv, ',').unwrap();

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_values_are_null() {
        let csv = "a,b,c\n1,,NaN";
        let table = parse_table(csv, ',').unwrap();
        let row = &table.rows()[0];

        assert_eq!(row.get("b"), Some(&Cell::Null));
        assert_eq!(row.get("c"), Some(&Cell::Null));
    }

    #[test]
    fn test_short_and_long_rows() {
        let csv = "a,b\n1\n1,2,3,4";
        let table = parse_table(csv, ',').unwrap();

        assert_eq!(table.rows()[0].get("b"), Some(&Cell::Null));
        assert_eq!(table.rows()[1].text("b"), "2");
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_table("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_auto_parse_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("ContentID,Title\nC1,괴물".as_bytes());
        let result = parse_bytes_auto(&bytes).unwrap();

        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.delimiter, ',');
        assert_eq!(result.headers, vec!["ContentID", "Title"]);
        assert_eq!(result.table.rows()[0].text("ContentID"), "C1");
        assert_eq!(result.table.rows()[0].text("Title"), "괴물");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_euc_kr_decoding() {
        // "가" in EUC-KR
        let bytes: &[u8] = &[0xB0, 0xA1];
        let decoded = decode_content(bytes, "euc-kr").unwrap();
        assert_eq!(decoded, "가");
    }
}
