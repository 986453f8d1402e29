//! # Roster Errors
//!
//! Error types for student request handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::storage::StorageError;

/// Result type for roster operations
pub type RosterResult<T> = Result<T, RosterError>;

/// Roster request errors
#[derive(Debug, Clone, Error)]
pub enum RosterError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Missing/empty name, id mismatch, unreadable body
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Student {0} not found")]
    StudentNotFound(i32),

    /// The class a request refers to does not exist
    #[error("Class {0} not found")]
    ClassNotFound(i32),

    #[error("Student {0} already exists")]
    DuplicateStudent(i32),

    /// Request body is not JSON
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// A stored relationship chain is broken
    #[error("Roster inconsistency: {0}")]
    Inconsistent(String),

    /// Mapping was called with arguments that do not belong together
    #[error("Contract violation: {0}")]
    Contract(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl RosterError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RosterError::Validation(_) => StatusCode::BAD_REQUEST,

            RosterError::StudentNotFound(_) => StatusCode::NOT_FOUND,
            RosterError::ClassNotFound(_) => StatusCode::NOT_FOUND,

            RosterError::DuplicateStudent(_) => StatusCode::CONFLICT,
            RosterError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            RosterError::Inconsistent(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RosterError::Contract(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RosterError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&RosterError> for ErrorResponse {
    fn from(err: &RosterError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "request failed");
        }
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
