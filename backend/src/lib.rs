//! # mecgen - MovieLabs MEC metadata generation
//!
//! mecgen turns a spreadsheet of per-language title metadata (one row per
//! language) into a single MovieLabs Media Entertainment Core (MEC) XML
//! document, and checks generated files against a reference sample.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │────▶│   MEC XML   │
//! │ (UTF8/EUC)  │     │  (auto-enc) │     │ (summaries) │     │  (builder)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                                             ┌─────────────┐
//!                                                             │  Compare    │
//!                                                             │ (structure) │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mecgen::{convert_csv, ConvertOptions};
//! use std::path::Path;
//!
//! let result = convert_csv(Path::new("metadata.csv"), &ConvertOptions::default()).unwrap();
//! println!("{}", result.xml.unwrap_or_default());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Defaults and environment settings
//! - [`field`] - Table model and tolerant field access
//! - [`models`] - Typed records extracted from rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`validation`] - Summary length checks
//! - [`mec`] - MEC document construction and serialization
//! - [`compare`] - Well-formedness and structure comparison
//! - [`transform`] - End-to-end conversion pipeline
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod field;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Generation
pub mod mec;

// Checking
pub mod compare;

// Pipeline
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BuildError, CompareError, CsvError, DocumentSide, FieldError, PipelineError, ServerError,
    XmlSyntaxError,
};

// =============================================================================
// Re-exports - Table and fields
// =============================================================================

pub use field::{get_field, require_fields, Cell, Field, Row, Table, REQUIRED_FIELDS};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ArtKind, ArtReference, BaseRecord, GenreRef, JobFunction, LocalizedBlock, Person, Rating,
    WorkType,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto,
    parse_table, ParseResult,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_table, validate_summary_length, SummaryField, ValidationError};

// =============================================================================
// Re-exports - MEC
// =============================================================================

pub use mec::{build_mec_document, build_mec_xml, Element};

// =============================================================================
// Re-exports - Compare
// =============================================================================

pub use compare::{
    annotate_xml_error, check_well_formed, diff_structure, is_well_formed, structure_entries,
    StructureDiff, StructureEntry,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    compare_documents, compare_files, convert_bytes, convert_csv, convert_table,
    ConversionResult, ConversionStatus, ConvertOptions, CsvInfo,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CompareResponse, ConvertResponse, ResponseMetadata};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
