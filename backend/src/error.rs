//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pilates_studio_shared::{ErrorDetail, ErrorResponse, RangeError, TransitionError};
use thiserror::Error;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify a repository failure
    ///
    /// Unique and foreign-key violations become 409 with a message naming
    /// the constraint; anything else stays a 500.
    pub fn from_repository(err: anyhow::Error) -> Self {
        let Some(db_err) = err
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
        else {
            return ApiError::Internal(err);
        };

        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("students_email_key") | Some("instructors_email_key") => {
                    "Email already in use"
                }
                Some("instructors_cpf_key") => "CPF already registered",
                Some("evolution_records_student_session_key") => {
                    "Session number already used for this student"
                }
                _ => "Record already exists",
            };
            return ApiError::Conflict(message.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return ApiError::Conflict(
                "Record is referenced by other records or references a missing one".to_string(),
            );
        }
        ApiError::Internal(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        match first_field_error(&errors, None) {
            Some((field, message)) => ApiError::InvalidField { field, message },
            None => ApiError::Validation(errors.to_string()),
        }
    }
}

/// Depth-first search for the first failing field, joined with dots for nested structs
fn first_field_error(errors: &ValidationErrors, prefix: Option<&str>) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (name, kind) in fields {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, name),
            None => name.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    let message = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", first.code));
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                if let Some(found) = first_field_error(nested, Some(&path)) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    if let Some(found) = first_field_error(nested, Some(&path)) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<RangeError> for ApiError {
    fn from(err: RangeError) -> Self {
        ApiError::invalid_field(err.field(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            ApiError::InvalidField { field, message } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, Some(field))
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
