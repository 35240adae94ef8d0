//! API-facing error type.
//!
//! Every handler returns `Result<_, AppError>`. The response body is always
//! `{"error": CODE, "message": text}` so clients can branch on the code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::auction::{BidError, BidRejection};
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    ValidationFailed(BidRejection),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("book {book_id} received a concurrent bid, retry against the new state")]
    Conflict { book_id: i64 },

    #[error("{message}")]
    StorageFailure { message: String, is_timeout: bool },

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationFailed(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::StorageFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationFailed(rejection) => rejection.code(),
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::StorageFailure { .. } => "STORAGE_FAILURE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<BidError> for AppError {
    fn from(err: BidError) -> Self {
        match err {
            BidError::NotFound(id) => AppError::NotFound(format!("Book {} not found", id)),
            BidError::Rejected(rejection) => AppError::ValidationFailed(rejection),
            BidError::Conflict { book_id } => AppError::Conflict { book_id },
            BidError::Storage {
                message,
                is_timeout,
            } => AppError::StorageFailure {
                message,
                is_timeout,
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::BookNotFound(id) => AppError::NotFound(format!("Book {} not found", id)),
            StoreError::Conflict { book_id, .. } => AppError::Conflict { book_id },
            StoreError::DuplicateUser(name) => {
                AppError::InvalidRequest(format!("username '{}' is already taken", name))
            }
            other => {
                tracing::error!(error = %other, is_timeout = false, "Storage call failed");
                AppError::StorageFailure {
                    message: other.to_string(),
                    is_timeout: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code() {
        let cases = [
            (AppError::NotFound("x".into()), 404, "NOT_FOUND"),
            (
                AppError::ValidationFailed(BidRejection::ExceedsCeiling {
                    amount: 2.0,
                    price: 1.0,
                }),
                400,
                "BID_EXCEEDS_CEILING",
            ),
            (AppError::Unauthorized("x".into()), 401, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), 403, "FORBIDDEN"),
            (AppError::Conflict { book_id: 1 }, 409, "CONFLICT"),
            (
                AppError::StorageFailure {
                    message: "down".into(),
                    is_timeout: true,
                },
                503,
                "STORAGE_FAILURE",
            ),
            (AppError::Internal("x".into()), 500, "INTERNAL_ERROR"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_bid_error_mapping() {
        let err: AppError = BidError::Storage {
            message: "timed out".into(),
            is_timeout: true,
        }
        .into();
        assert!(matches!(err, AppError::StorageFailure { is_timeout: true, .. }));

        let err: AppError = BidError::NotFound(7).into();
        assert_eq!(err.to_string(), "Book 7 not found");
    }

    #[test]
    fn test_store_error_mapping() {
        let err: AppError = StoreError::Unavailable("gone".into()).into();
        assert_eq!(err.code(), "STORAGE_FAILURE");

        let err: AppError = StoreError::DuplicateUser("alice".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
