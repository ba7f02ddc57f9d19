//! API error types with IntoResponse
//!
//! Errors are converted to JSON envelopes with appropriate status codes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;
use crate::review::ReviewError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input (400)
    InvalidRequest(ValidationError),

    /// Nothing matched (404)
    NotFound { message: String },

    /// Store failure (500, logged, message passed through as details)
    Persistence { message: String, details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidRequest(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "invalid_request",
                    "message": e.to_string()
                }),
            ),
            Self::NotFound { message } => (
                StatusCode::NOT_FOUND,
                json!({
                    "success": false,
                    "error": "not_found",
                    "message": message
                }),
            ),
            Self::Persistence { message, details } => {
                tracing::error!(details = %details, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "success": false,
                        "error": "persistence_error",
                        "message": message,
                        "details": details
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidRequest(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound {
                message: format!("{} '{}' not found", resource, id),
            },
            other => Self::Persistence {
                message: "database operation failed".into(),
                details: other.to_string(),
            },
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::NotFound { .. } => Self::NotFound {
                message: "No items found with the provided IDs".into(),
            },
            ReviewError::Persistence(db) => Self::Persistence {
                message: "Failed to update items".into(),
                details: db.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(ValidationError::InvalidFormat {
            field: "body",
            reason: rejection.body_text(),
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(ValidationError::InvalidFormat {
            field: "query",
            reason: rejection.body_text(),
        })
    }
}
