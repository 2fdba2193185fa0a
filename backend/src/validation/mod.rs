//! Summary length validation.
//!
//! MEC delivery specs cap `Summary190` at 190 characters and `Summary400` at
//! 400. Every row is checked, including rows without a language, and every
//! violation is reported; nothing here stops the caller from generating XML
//! anyway.
//!
//! Row numbers are spreadsheet line numbers: data row `i` (0-based) is
//! reported as `i + 2` because line 1 is the header.
//!
//! # Example
//!
//! ```rust
//! use mecgen::field::Table;
//! use mecgen::validation::{validate_summary_length, SummaryField};
//!
//! let long = "x".repeat(191);
//! let table = Table::from_text(&["Summary190"], &[vec![long.as_str()]]);
//! let errors = validate_summary_length(&table);
//!
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].row, 2);
//! assert_eq!(errors[0].field, SummaryField::Summary190);
//! assert_eq!(errors[0].length, 191);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::{get_field, Field, Table};

/// Line offset between a 0-based row index and the spreadsheet line.
const HEADER_OFFSET: usize = 2;

/// The length-bounded summary fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryField {
    Summary190,
    Summary400,
}

impl SummaryField {
    pub const ALL: [SummaryField; 2] = [SummaryField::Summary190, SummaryField::Summary400];

    /// Maximum allowed length (inclusive).
    pub fn limit(self) -> usize {
        match self {
            SummaryField::Summary190 => 190,
            SummaryField::Summary400 => 400,
        }
    }

    fn field(self) -> Field {
        match self {
            SummaryField::Summary190 => Field::Summary190,
            SummaryField::Summary400 => Field::Summary400,
        }
    }
}

impl fmt::Display for SummaryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field().column())
    }
}

/// A summary that exceeds its limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Spreadsheet line number (header is line 1).
    pub row: usize,
    pub field: SummaryField,
    /// Observed length in characters.
    pub length: usize,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row {}: {} has {} characters (max {})",
            self.row,
            self.field,
            self.length,
            self.field.limit()
        )
    }
}

/// Report every summary longer than its limit, row by row.
pub fn validate_summary_length(table: &Table) -> Vec<ValidationError> {
    table
        .rows()
        .iter()
        .enumerate()
        .flat_map(|(index, row)| {
            SummaryField::ALL.into_iter().filter_map(move |field| {
                let length = get_field(row, field.field()).chars().count();
                (length > field.limit()).then_some(ValidationError {
                    row: index + HEADER_OFFSET,
                    field,
                    length,
                })
            })
        })
        .collect()
}

/// Quick check: no summary exceeds its limit.
pub fn is_valid_table(table: &Table) -> bool {
    validate_summary_length(table).is_empty()
}
