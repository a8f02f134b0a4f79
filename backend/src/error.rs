//! Error handling for the Godown fulfillment engine
//!
//! NotFound and precondition failures are expected business outcomes and
//! map to typed responses; only store failures are logged as errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Missing resources
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Preconditions (expected business outcomes, never system errors)
    #[error("Serial numbers pending for dispatch units")]
    SerialsPending { pending_units: Vec<uuid::Uuid> },

    #[error("Dispatch unit already returned")]
    AlreadyReturned,

    #[error("Dispatch unit has not been dispatched")]
    NotDispatched,

    #[error("No active bill of materials for product")]
    NoActiveBom,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Concurrent-update races and duplicate activations
    #[error("Conflict: {0}")]
    Conflict(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a validation error for a named field.
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_units: Option<Vec<uuid::Uuid>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::SerialsPending { pending_units } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "SERIALS_PENDING".to_string(),
                    message: "One or more product units have no serial number assigned"
                        .to_string(),
                    field: None,
                    pending_units: Some(pending_units.clone()),
                },
            ),
            AppError::AlreadyReturned => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "ALREADY_RETURNED".to_string(),
                    message: "This dispatch unit has already been returned".to_string(),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::NotDispatched => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "NOT_DISPATCHED".to_string(),
                    message: "This dispatch unit has not had its stock deducted".to_string(),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::NoActiveBom => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "NO_ACTIVE_BOM".to_string(),
                    message: "Product has no active bill of materials".to_string(),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                    pending_units: None,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: msg.clone(),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                    pending_units: None,
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                    pending_units: None,
                },
            ),
        };

        match &self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Configuration(_) => {
                tracing::error!("Error: {:?}", self);
            }
            _ => {
                tracing::debug!("Request rejected: {:?}", self);
            }
        }

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
