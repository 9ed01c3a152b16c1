//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body failed the registration schema
    #[error("{0}")]
    Validation(#[from] FieldError),

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    /// Unexpected persistence-layer fault
    #[error("Store failure: {0}")]
    StoreFailure(#[from] StoreFailure),

    #[error("Internal server error")]
    Internal(String),
}

/// Faults raised by the user store.
///
/// A unique violation reported by the store (a concurrent registration won
/// the race after our pre-checks passed) is still a store failure, kept
/// apart only so it can be logged distinctly.
#[derive(Error, Debug)]
pub enum StoreFailure {
    #[error("database error: {0}")]
    Database(DbErr),

    #[error("unique constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl From<DbErr> for StoreFailure {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                StoreFailure::ConstraintViolation(detail)
            }
            _ => StoreFailure::Database(err),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::StoreFailure(err.into())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: String,
}

impl AppError {
    /// Get error code for client. Validation failures carry none.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::Validation(_) => None,
            AppError::DuplicateUsername => Some("DUPLICATE_USERNAME"),
            AppError::DuplicateEmail => Some("DUPLICATE_EMAIL"),
            AppError::StoreFailure(_) => Some("STORE_FAILURE"),
            AppError::Internal(_) => Some("INTERNAL_ERROR"),
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername | AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::StoreFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this is a uniqueness conflict (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::DuplicateUsername | AppError::DuplicateEmail)
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::StoreFailure(e) => {
                tracing::error!("Store failure: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            code: self.code(),
            message: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        AppError::StoreFailure(StoreFailure::Timeout { operation, after })
    }
}
