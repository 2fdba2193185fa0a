//! Error types for the MEC generation pipeline.
//!
//! Each layer owns one error type:
//!
//! - [`CsvError`] - CSV reading and decoding errors
//! - [`FieldError`] - Missing required columns at ingestion
//! - [`BuildError`] - MEC tree construction / serialization errors
//! - [`XmlSyntaxError`] - A document is not well-formed
//! - [`CompareError`] - Structure comparison could not run
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Summary length violations are *not* errors: they are reported as data
//! by [`crate::validation`]. The same goes for lenient fallbacks such as
//! malformed rating segments or unparsable dates.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content as {0}")]
    Encoding(String),

    /// Invalid CSV format.
    #[error("Invalid CSV at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        CsvError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Errors raised when a table cannot supply a required logical field.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    /// No column matches the field under any case variant.
    #[error("Missing required column '{field}' (also tried '{lowercase}')")]
    MissingColumn { field: String, lowercase: String },
}

// =============================================================================
// Build Errors
// =============================================================================

/// Errors while building or serializing the MEC document.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The table has no rows, so there is no base record.
    #[error("Cannot build MEC metadata from an empty table")]
    EmptyTable,

    /// Writing the XML text failed.
    #[error("Failed to serialize XML: {0}")]
    Serialize(String),
}

// =============================================================================
// XML Syntax Errors
// =============================================================================

/// A document failed to parse as XML.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("line {line}, column {column}: {message}")]
pub struct XmlSyntaxError {
    /// 1-based line of the failure.
    pub line: u32,
    /// 1-based column of the failure.
    pub column: u32,
    /// Parser message.
    pub message: String,
}

impl From<roxmltree::Error> for XmlSyntaxError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        Self {
            line: pos.row,
            column: pos.col,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Compare Errors
// =============================================================================

/// Which of the two compared documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSide {
    /// The reference document (`A`, usually a sample MEC file).
    Sample,
    /// The candidate document (`B`, usually generated output).
    Generated,
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSide::Sample => write!(f, "sample"),
            DocumentSide::Generated => write!(f, "generated"),
        }
    }
}

/// Errors during structure comparison.
#[derive(Debug, Error, PartialEq)]
pub enum CompareError {
    /// One of the documents is not well-formed.
    #[error("Cannot parse {side} document: {source}")]
    Parse {
        side: DocumentSide,
        #[source]
        source: XmlSyntaxError,
    },
}

impl CompareError {
    /// The document that failed.
    pub fn side(&self) -> DocumentSide {
        match self {
            CompareError::Parse { side, .. } => *side,
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Required column missing.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// MEC build error.
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Structure comparison error.
    #[error("Compare error: {0}")]
    Compare(#[from] CompareError),

    /// File IO outside CSV parsing (XML inputs, outputs).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No data rows to convert.
    #[error("No rows to convert")]
    EmptyInput,
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for MEC build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type for comparison operations.
pub type CompareResult<T> = Result<T, CompareError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // FieldError -> PipelineError
        let field_err = FieldError::MissingColumn {
            field: "ContentID".into(),
            lowercase: "contentid".into(),
        };
        let pipeline_err: PipelineError = field_err.into();
        assert!(pipeline_err.to_string().contains("ContentID"));
    }

    #[test]
    fn test_compare_error_names_side() {
        let err = CompareError::Parse {
            side: DocumentSide::Generated,
            source: XmlSyntaxError {
                line: 3,
                column: 7,
                message: "unexpected end of stream".into(),
            },
        };
        assert_eq!(err.side(), DocumentSide::Generated);
        let msg = err.to_string();
        assert!(msg.contains("generated"));
        assert!(msg.contains("line 3, column 7"));
    }

    #[test]
    fn test_syntax_error_from_roxmltree() {
        let err = roxmltree::Document::parse("<a>\n<b></a>").unwrap_err();
        let syntax: XmlSyntaxError = err.into();
        assert_eq!(syntax.line, 2);
        assert!(!syntax.message.is_empty());
    }
}
