//! REST API types for frontend integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::compare::{StructureDiff, StructureEntry};
use crate::error::{PipelineError, ServerError};
use crate::transform::pipeline::{ConversionResult, ConversionStatus};
use crate::validation::ValidationError;

/// Response sent after a CSV upload has been converted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// Unique job identifier
    pub job_id: String,

    pub status: ConversionStatus,

    /// MEC document, absent when validation stopped the run
    pub xml: Option<String>,

    pub well_formed: bool,

    /// Summary length violations
    pub validation_errors: Vec<ValidationError>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the uploaded CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<ConversionResult> for ConvertResponse {
    fn from(result: ConversionResult) -> Self {
        ConvertResponse {
            job_id: Uuid::new_v4().to_string(),
            status: result.status,
            xml: result.xml,
            well_formed: result.well_formed,
            validation_errors: result.validation_errors,
            metadata: ResponseMetadata {
                encoding: result.csv_info.encoding,
                delimiter: result.csv_info.delimiter.to_string(),
                row_count: result.csv_info.row_count,
                columns: result.csv_info.headers,
            },
        }
    }
}

/// Response for a structure comparison.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub job_id: String,
    pub identical: bool,
    /// In the sample, not in the generated document
    pub missing: Vec<StructureEntry>,
    /// In the generated document, not in the sample
    pub extra: Vec<StructureEntry>,
}

impl From<StructureDiff> for CompareResponse {
    fn from(diff: StructureDiff) -> Self {
        CompareResponse {
            job_id: Uuid::new_v4().to_string(),
            identical: diff.is_identical(),
            missing: diff.missing,
            extra: diff.extra,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Csv(_))
            | ServerError::Pipeline(PipelineError::Field(_))
            | ServerError::Pipeline(PipelineError::Compare(_))
            | ServerError::Pipeline(PipelineError::EmptyInput) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::Pipeline(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvError, FieldError};
    use crate::transform::pipeline::CsvInfo;
    use crate::validation::SummaryField;

    fn conversion(status: ConversionStatus) -> ConversionResult {
        ConversionResult {
            csv_info: CsvInfo {
                encoding: "utf-8".into(),
                delimiter: ';',
                headers: vec!["ContentID".into(), "Language".into()],
                row_count: 2,
            },
            validation_errors: vec![ValidationError {
                row: 2,
                field: SummaryField::Summary190,
                length: 191,
            }],
            xml: None,
            well_formed: false,
            status,
        }
    }

    #[test]
    fn test_convert_response_shape() {
        let response = ConvertResponse::from(conversion(ConversionStatus::Invalid));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "invalid");
        assert_eq!(json["wellFormed"], false);
        assert!(json["xml"].is_null());
        assert_eq!(json["metadata"]["delimiter"], ";");
        assert_eq!(json["metadata"]["rowCount"], 2);
        assert_eq!(json["validationErrors"][0]["length"], 191);
        assert!(Uuid::parse_str(json["jobId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_compare_response() {
        let diff = StructureDiff {
            missing: vec![StructureEntry {
                path: "/r/a".into(),
                attributes: vec![],
            }],
            extra: vec![],
        };
        let response = CompareResponse::from(diff);
        assert!(!response.identical);
        assert_eq!(response.missing.len(), 1);
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ServerError::BadRequest("no file".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::Pipeline(CsvError::EmptyFile.into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let missing = FieldError::MissingColumn {
            field: "Language".into(),
            lowercase: "language".into(),
        };
        assert_eq!(
            ServerError::Pipeline(missing.into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::Internal("join".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_body() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
    }
}
