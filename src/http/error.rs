//! API error handling.
//!
//! Service errors map onto status codes here. Store failures keep a
//! one-line detail string but never the full error chain.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::dto::ErrorBody;
use crate::task::services::TaskServiceError;

/// API error response containing status code and error body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                details,
            },
        }
    }

    /// Creates a 400 Bad Request response.
    #[must_use]
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, None)
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Task not found or not owned by this user",
            None,
        )
    }

    /// Creates a 500 response for an unrecognized table layout.
    #[must_use]
    pub fn configuration(columns: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unrecognized database structure",
            Some(format!("Available columns: {columns}")),
        )
    }

    /// Creates a 500 response for a failed store call.
    #[must_use]
    pub fn store_failure(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Task store failure",
            Some(details.into()),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<TaskServiceError> for ApiErrorResponse {
    fn from(error: TaskServiceError) -> Self {
        match error {
            TaskServiceError::Validation(err) => Self::bad_request(err.to_string()),
            TaskServiceError::NotFound(_) => Self::not_found(),
            TaskServiceError::Configuration(schema) => Self::configuration(&schema.columns_list()),
            TaskServiceError::Store(source) => Self::store_failure(source.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            Some(rejection.body_text()),
        )
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid path parameter",
            Some(rejection.body_text()),
        )
    }
}
