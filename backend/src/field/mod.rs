//! Tolerant field access over loosely typed tables.
//!
//! Spreadsheet exports are inconsistent: the same logical column shows up as
//! `Title`, `title` or `TITLE`, numeric columns come back as `2024.0`, and
//! empty cells arrive as `NaN`. This module hides all of that behind
//! [`Row::text`] and [`get_field`], which always return a plain `String`
//! (empty when the value is missing).
//!
//! # Example
//!
//! ```rust
//! use mecgen::field::{get_field, Cell, Field, Row};
//!
//! let row = Row::from_pairs([
//!     ("contentid", Cell::from("T-100")),
//!     ("ReleaseYear", Cell::from(2024.0)),
//! ]);
//! assert_eq!(get_field(&row, Field::ContentId), "T-100");
//! assert_eq!(get_field(&row, Field::ReleaseYear), "2024");
//! ```

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FieldError;

/// Canonical date format for `ReleaseDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cell contents a dataframe loader would read as NaN.
const MISSING_MARKERS: &[&str] = &[
    "nan", "NaN", "NAN", "-nan", "-NaN", "NA", "N/A", "n/a", "null", "NULL", "None", "#N/A",
    "<NA>",
];

/// Integer-valued numbers that went through a float column (`"2024.0"`).
static FLOAT_ARTIFACT: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^[+-]?\d+\.0$").expect("valid float artifact pattern"));

// =============================================================================
// Cells
// =============================================================================

/// A raw table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    /// Interpret a raw CSV value, mapping missing-value markers to [`Cell::Null`].
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() || MISSING_MARKERS.contains(&raw.trim()) {
            Cell::Null
        } else {
            Cell::Text(raw.to_string())
        }
    }

    /// `true` for nulls and NaN numbers.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(n) => n.is_nan(),
            Cell::Text(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_raw(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from_raw(&value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// Stringify a cell: missing values become `""`, float artifacts lose `.0`.
pub fn cell_to_string(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Number(n) if n.is_nan() => String::new(),
        Cell::Number(n) => strip_float_artifact(&n.to_string()),
        Cell::Text(s) => strip_float_artifact(s),
    }
}

/// Drop a trailing `.0` from an integer-valued numeric string.
pub fn strip_float_artifact(value: &str) -> String {
    if FLOAT_ARTIFACT.is_match(value) {
        value[..value.len() - 2].to_string()
    } else {
        value.to_string()
    }
}

/// Normalize a date-like cell to `YYYY-MM-DD`.
///
/// Numbers are collapsed to their integer text first and `.` separators are
/// read as `-`. Anything that still does not parse is returned as that
/// best-effort text, so `2024.13.40` becomes `2024-13-40`.
pub fn to_date_string(cell: &Cell) -> String {
    let candidate = match cell {
        Cell::Number(n) if n.is_finite() => format!("{}", n.trunc() as i64),
        other => cell_to_string(other),
    }
    .replace('.', "-");

    match NaiveDate::parse_from_str(candidate.trim(), DATE_FORMAT) {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => candidate,
    }
}

// =============================================================================
// Rows and tables
// =============================================================================

/// One table row: column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Cell)>,
        K: Into<String>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, cell: Cell) {
        self.cells.push((column.into(), cell));
    }

    /// Exact-name lookup.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Tolerant lookup of a logical column.
    ///
    /// Tries the exact name, then its lower-cased spelling, then any column
    /// equal ignoring ASCII case. The first candidate with a non-empty value
    /// wins.
    pub fn lookup(&self, name: &str) -> Option<&Cell> {
        let lower = name.to_lowercase();
        let exact = self.get(name);
        let lowered = self.get(&lower);
        let folded = self
            .cells
            .iter()
            .filter(|(c, _)| c != name && *c != lower && c.eq_ignore_ascii_case(name))
            .map(|(_, v)| v);

        exact
            .into_iter()
            .chain(lowered)
            .chain(folded)
            .find(|cell| !cell_to_string(cell).is_empty())
    }

    /// Tolerant lookup, stringified. Missing values come back as `""`.
    pub fn text(&self, name: &str) -> String {
        self.lookup(name).map(cell_to_string).unwrap_or_default()
    }

    /// JSON object view of the row (used by `mecgen parse`).
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (column, cell) in &self.cells {
            let value = serde_json::to_value(cell).unwrap_or(Value::Null);
            obj.insert(column.clone(), value);
        }
        Value::Object(obj)
    }
}

/// An ordered sequence of rows sharing one header line.
///
/// Row order matters: the first row is the base record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from string cells; short rows are padded with nulls.
    pub fn from_text<S: AsRef<str>>(headers: &[S], rows: &[Vec<&str>]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| {
                Row::from_pairs(headers.iter().enumerate().map(|(i, h)| {
                    let cell = values.get(i).map(|v| Cell::from_raw(v)).unwrap_or(Cell::Null);
                    (h.clone(), cell)
                }))
            })
            .collect();
        Self { headers, rows }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `true` if some header matches `name` ignoring ASCII case.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.eq_ignore_ascii_case(name))
    }

    /// Headers whose name starts with `genre`, in column order.
    pub fn genre_columns(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|h| is_genre_column(h))
    }
}

/// Genre columns are any column whose name starts with `genre` (any case).
pub fn is_genre_column(name: &str) -> bool {
    name.to_lowercase().starts_with("genre")
}

// =============================================================================
// Logical fields
// =============================================================================

/// The logical fields the MEC builder reads, with their canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ContentId,
    WorkType,
    ReleaseYear,
    ReleaseDate,
    AltIdOrg,
    RatingInfo,
    OriginalLanguage,
    OrgId,
    SequenceNumber,
    ParentContentId,
    DisplayString,
    Language,
    Title,
    Summary190,
    Summary400,
    BoxArt,
    Cover,
    Hero,
    Poster,
    Director,
    Writer,
    Actor1,
    Actor2,
    Actor3,
    Actor4,
    Actor5,
    Actor6,
}

impl Field {
    /// Canonical column name.
    pub fn column(self) -> &'static str {
        match self {
            Field::ContentId => "ContentID",
            Field::WorkType => "WorkType",
            Field::ReleaseYear => "ReleaseYear",
            Field::ReleaseDate => "ReleaseDate",
            Field::AltIdOrg => "AltID_ORG",
            Field::RatingInfo => "RatingInfo",
            Field::OriginalLanguage => "OriginalLanguage",
            Field::OrgId => "OrgID",
            Field::SequenceNumber => "SequenceNumber",
            Field::ParentContentId => "ParentContentID",
            Field::DisplayString => "DisplayString",
            Field::Language => "Language",
            Field::Title => "Title",
            Field::Summary190 => "Summary190",
            Field::Summary400 => "Summary400",
            Field::BoxArt => "boxart",
            Field::Cover => "cover",
            Field::Hero => "hero",
            Field::Poster => "poster",
            Field::Director => "Director",
            Field::Writer => "Writer",
            Field::Actor1 => "Actor1",
            Field::Actor2 => "Actor2",
            Field::Actor3 => "Actor3",
            Field::Actor4 => "Actor4",
            Field::Actor5 => "Actor5",
            Field::Actor6 => "Actor6",
        }
    }
}

/// Fields the pipeline refuses to run without.
pub const REQUIRED_FIELDS: &[Field] = &[Field::ContentId, Field::Language];

/// Resolve a logical field on a row.
pub fn get_field(row: &Row, field: Field) -> String {
    row.text(field.column())
}

/// Resolve a logical field as a raw cell (for date normalization).
pub fn get_cell(row: &Row, field: Field) -> Cell {
    row.lookup(field.column()).cloned().unwrap_or(Cell::Null)
}

/// Check at ingestion time that every `fields` entry has a column.
pub fn require_fields(table: &Table, fields: &[Field]) -> Result<(), FieldError> {
    match fields.iter().find(|f| !table.has_column(f.column())) {
        Some(field) => Err(FieldError::MissingColumn {
            field: field.column().to_string(),
            lowercase: field.column().to_lowercase(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_markers_are_null() {
        assert_eq!(Cell::from_raw(""), Cell::Null);
        assert_eq!(Cell::from_raw("   "), Cell::Null);
        assert_eq!(Cell::from_raw("NaN"), Cell::Null);
        assert_eq!(Cell::from_raw("N/A"), Cell::Null);
        assert_eq!(Cell::from_raw("Nana"), Cell::Text("Nana".into()));
        assert!(Cell::Number(f64::NAN).is_missing());
    }

    #[test]
    fn test_float_artifact_stripped() {
        assert_eq!(cell_to_string(&Cell::from("2024.0")), "2024");
        assert_eq!(cell_to_string(&Cell::from(2024.0)), "2024");
        assert_eq!(cell_to_string(&Cell::from(3.5)), "3.5");
        assert_eq!(cell_to_string(&Cell::from("-7.0")), "-7");
        // only numeric-looking values are touched
        assert_eq!(cell_to_string(&Cell::from("Version 2.0")), "Version 2.0");
        assert_eq!(cell_to_string(&Cell::from("1.50")), "1.50");
        assert_eq!(cell_to_string(&Cell::Number(f64::NAN)), "");
    }

    #[test]
    fn test_lookup_exact_then_lowercase() {
        let row = Row::from_pairs([
            ("Title", Cell::Null),
            ("title", Cell::from("Lower")),
        ]);
        assert_eq!(row.text("Title"), "Lower");

        let row = Row::from_pairs([
            ("Title", Cell::from("Exact")),
            ("title", Cell::from("Lower")),
        ]);
        assert_eq!(row.text("Title"), "Exact");
    }

    #[test]
    fn test_lookup_any_case() {
        let row = Row::from_pairs([("TITLE", Cell::from("Shouting"))]);
        assert_eq!(row.text("Title"), "Shouting");
        assert_eq!(row.text("Summary190"), "");
    }

    #[test]
    fn test_get_field_uses_canonical_spelling() {
        let row = Row::from_pairs([("altid_org", Cell::from("ALT-1"))]);
        assert_eq!(get_field(&row, Field::AltIdOrg), "ALT-1");
        assert_eq!(get_field(&row, Field::OrgId), "");
    }

    #[test]
    fn test_date_normalization() {
        assert_eq!(to_date_string(&Cell::from("2024-01-05")), "2024-01-05");
        assert_eq!(to_date_string(&Cell::from("2024.01.05")), "2024-01-05");
        assert_eq!(to_date_string(&Cell::from("2024-1-5")), "2024-01-05");
    }

    #[test]
    fn test_date_fallback_keeps_original() {
        assert_eq!(to_date_string(&Cell::from("05/01/2024")), "05/01/2024");
        assert_eq!(to_date_string(&Cell::from(20240105.0)), "20240105");
        assert_eq!(to_date_string(&Cell::from("soon")), "soon");
        assert_eq!(to_date_string(&Cell::from("2024.13.40")), "2024-13-40");
        assert_eq!(to_date_string(&Cell::from("v1.5")), "v1-5");
        assert_eq!(to_date_string(&Cell::Null), "");
    }

    #[test]
    fn test_table_from_text_pads_short_rows() {
        let table = Table::from_text(&["a", "b"], &[vec!["1"]]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get("b"), Some(&Cell::Null));
    }

    #[test]
    fn test_genre_columns() {
        let table = Table::from_text(&["Title", "Genre1", "genre_2", "Subgenre"], &[]);
        let genres: Vec<&str> = table.genre_columns().collect();
        assert_eq!(genres, vec!["Genre1", "genre_2"]);
    }

    #[test]
    fn test_require_fields() {
        let table = Table::from_text(&["contentid", "LANGUAGE"], &[]);
        assert!(require_fields(&table, REQUIRED_FIELDS).is_ok());

        let table = Table::from_text(&["Title"], &[]);
        let err = require_fields(&table, REQUIRED_FIELDS).unwrap_err();
        assert_eq!(
            err,
            FieldError::MissingColumn {
                field: "ContentID".into(),
                lowercase: "contentid".into(),
            }
        );
    }

    #[test]
    fn test_row_to_json() {
        let row = Row::from_pairs([("a", Cell::from("x")), ("b", Cell::Null)]);
        assert_eq!(row.to_json(), serde_json::json!({ "a": "x", "b": null }));
    }
}
