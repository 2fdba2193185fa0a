//! High-level pipeline API for CSV to MEC conversion.
//!
//! This module combines all steps: parsing, required-column checks, summary
//! validation, XML generation and the well-formedness check.
//!
//! # Example
//!
//! ```rust,ignore
//! use mecgen::transform::pipeline::{convert_csv, ConvertOptions};
//! use std::path::Path;
//!
//! let result = convert_csv(Path::new("metadata.csv"), &ConvertOptions::default())?;
//! if let Some(xml) = result.xml {
//!     std::fs::write("MEC_Metadata.xml", xml)?;
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::logs::{
    log_error, log_info, log_info_indent, log_success, log_warning, log_warning_indent,
};
use crate::compare::{annotate_xml_error, check_well_formed, diff_structure, StructureDiff};
use crate::error::{PipelineError, PipelineResult};
use crate::field::{require_fields, Table, REQUIRED_FIELDS};
use crate::mec::build_mec_xml;
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::validation::{validate_summary_length, ValidationError};

/// How many violations are echoed to the log.
const MAX_LOGGED_VIOLATIONS: usize = 5;

/// Listing lines logged on each side of a well-formedness failure.
const ERROR_CONTEXT_LINES: usize = 2;

/// Options for the conversion pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Skip the summary length check entirely
    pub skip_validation: bool,

    /// Generate XML even when summaries are too long
    pub allow_violations: bool,
}

/// Outcome of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    /// XML generated and well-formed, no violations
    Ready,
    /// XML generated and well-formed, violations were allowed through
    Warning,
    /// Stopped at summary validation, no XML
    Invalid,
    /// XML generated but not well-formed
    Malformed,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl CsvInfo {
    fn from_parse(result: &ParseResult) -> Self {
        Self {
            encoding: result.encoding.clone(),
            delimiter: result.delimiter,
            headers: result.headers.clone(),
            row_count: result.table.len(),
        }
    }

    /// Info for a table that did not come from a file.
    pub fn for_table(table: &Table) -> Self {
        Self {
            encoding: "utf-8".to_string(),
            delimiter: ',',
            headers: table.headers().to_vec(),
            row_count: table.len(),
        }
    }
}

/// Result of a complete conversion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// CSV parsing metadata
    pub csv_info: CsvInfo,

    /// Summary length violations (empty when validation was skipped)
    pub validation_errors: Vec<ValidationError>,

    /// Generated document, `None` when validation stopped the run
    pub xml: Option<String>,

    /// Whether `xml` parsed back
    pub well_formed: bool,

    pub status: ConversionStatus,
}

/// Convert a CSV file to MEC XML.
///
/// This is the main entry point for the pipeline. It:
/// 1. Parses the CSV with auto-detection
/// 2. Checks required columns
/// 3. Validates summary lengths (stops here on violations unless allowed)
/// 4. Builds the MEC document
/// 5. Checks the output is well-formed
pub fn convert_csv(path: &Path, options: &ConvertOptions) -> PipelineResult<ConversionResult> {
    log_info(format!("📖 Reading {}", path.display()));
    let parse_result = parse_csv_file_auto(path)?;
    convert_parsed(parse_result, options)
}

/// Same as [`convert_csv`] for raw bytes (uploads).
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> PipelineResult<ConversionResult> {
    log_info(format!("📖 Reading upload ({} bytes)", bytes.len()));
    let parse_result = parse_bytes_auto(bytes)?;
    convert_parsed(parse_result, options)
}

fn convert_parsed(
    parse_result: ParseResult,
    options: &ConvertOptions,
) -> PipelineResult<ConversionResult> {
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!(
        "Detected separator: '{}'",
        format_delimiter(parse_result.delimiter)
    ));
    log_success(format!("Read {} language rows", parse_result.table.len()));

    let csv_info = CsvInfo::from_parse(&parse_result);
    convert_table(&parse_result.table, csv_info, options)
}

/// Convert an already-loaded table.
pub fn convert_table(
    table: &Table,
    csv_info: CsvInfo,
    options: &ConvertOptions,
) -> PipelineResult<ConversionResult> {
    if table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    require_fields(table, REQUIRED_FIELDS)?;

    // Step 1: Summary lengths
    let validation_errors = if options.skip_validation {
        log_info("(summary validation skipped)");
        Vec::new()
    } else {
        log_info("✔️  Checking summary lengths...");
        let errors = validate_summary_length(table);
        print_validation_result(&errors);
        errors
    };

    if !validation_errors.is_empty() && !options.allow_violations {
        log_error("Stopping: fix the summaries above before generating XML");
        return Ok(ConversionResult {
            csv_info,
            validation_errors,
            xml: None,
            well_formed: false,
            status: ConversionStatus::Invalid,
        });
    }

    // Step 2: Build
    log_info("⚙️  Building MEC document...");
    let xml = build_mec_xml(table)?;
    log_success(format!("Generated {} bytes of XML", xml.len()));

    // Step 3: Well-formedness
    let well_formed = match check_well_formed(&xml) {
        Ok(()) => {
            log_success("XML structure check passed");
            true
        }
        Err(err) => {
            log_error(format!("XML structure check failed: {}", err));
            if let Some(report) = annotate_xml_error(&xml) {
                for line in error_context(&report, err.line) {
                    log_info_indent(line, 1);
                }
            }
            false
        }
    };

    let status = match (well_formed, validation_errors.is_empty()) {
        (false, _) => ConversionStatus::Malformed,
        (true, true) => ConversionStatus::Ready,
        (true, false) => ConversionStatus::Warning,
    };

    Ok(ConversionResult {
        csv_info,
        validation_errors,
        xml: Some(xml),
        well_formed,
        status,
    })
}

/// Compare two XML documents held in memory.
pub fn compare_documents(sample: &str, generated: &str) -> PipelineResult<StructureDiff> {
    log_info("🧩 Comparing XML structure...");
    let diff = diff_structure(sample, generated)?;

    if diff.is_identical() {
        log_success("Structures match");
    } else {
        if !diff.missing.is_empty() {
            log_warning(format!("{} entries missing from generated XML", diff.missing.len()));
        }
        if !diff.extra.is_empty() {
            log_warning(format!("{} extra entries in generated XML", diff.extra.len()));
        }
    }

    Ok(diff)
}

/// Read two XML files and compare their structure.
pub fn compare_files(sample: &Path, generated: &Path) -> PipelineResult<StructureDiff> {
    let sample = std::fs::read_to_string(sample)?;
    let generated = std::fs::read_to_string(generated)?;
    compare_documents(&sample, &generated)
}

/// Lines of an annotated listing around the failing line.
///
/// The first line of the report is the parser message; listing line `n`
/// (1-based) follows it.
fn error_context(report: &str, failing_line: u32) -> Vec<&str> {
    let failing = failing_line as usize;
    let first = failing.saturating_sub(ERROR_CONTEXT_LINES).max(1);
    let last = failing + ERROR_CONTEXT_LINES;

    report
        .lines()
        .skip(1)
        .enumerate()
        .filter(|(index, _)| (first..=last).contains(&(index + 1)))
        .map(|(_, line)| line)
        .collect()
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

/// Print validation result
fn print_validation_result(errors: &[ValidationError]) {
    if errors.is_empty() {
        log_success("All summaries within limits");
        return;
    }

    log_warning(format!("{} summaries over the limit", errors.len()));
    for err in errors.iter().take(MAX_LOGGED_VIOLATIONS) {
        log_warning_indent(err.to_string(), 1);
    }
    if errors.len() > MAX_LOGGED_VIOLATIONS {
        log_warning_indent(format!("... +{}", errors.len() - MAX_LOGGED_VIOLATIONS), 1);
    }
}
