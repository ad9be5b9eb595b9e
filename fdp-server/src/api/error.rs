//! API error responses
//!
//! Every handler failure funnels through [`ApiError`], which picks the status
//! code and JSON body. Internal details are logged, never returned.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fdp_common::{Error, ValidationErrors};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Body parsed but failed field validation
    Validation(ValidationErrors),
    /// Body was not valid JSON
    MalformedBody(String),
    DuplicateNumber,
    NotFound,
    InvalidSortField(String),
    /// Batch import body was not a non-empty array
    NoProjects,
    /// CSV text held no importable rows
    NoValidRows,
    InvalidCsv(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            Error::DuplicateKey(_) => ApiError::DuplicateNumber,
            Error::Csv(msg) => ApiError::InvalidCsv(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

/// Ids that are not numbers cannot name a project
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid project data", "errors": errors }),
            ),
            ApiError::MalformedBody(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid project data", "error": detail }),
            ),
            ApiError::DuplicateNumber => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Design project number already exists" }),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Project not found" }),
            ),
            ApiError::InvalidSortField(field) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": format!("Invalid sort field: {}", field) }),
            ),
            ApiError::NoProjects => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No projects provided" }),
            ),
            ApiError::NoValidRows => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No valid projects found in CSV file" }),
            ),
            ApiError::InvalidCsv(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid CSV", "detail": detail }),
            ),
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
